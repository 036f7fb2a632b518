//! Cell normalizer: numbers and ranges out of noisy report cells.

use std::sync::LazyLock;

use regex::Regex;

use crate::intelligence::ReferenceTables;

/// Unsigned decimal: digits with an optional fractional part.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Signed decimal for single values.
static SIGNED_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A number located inside a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberMatch {
    /// Byte offset of the first character (the sign, if any).
    pub start: usize,
    /// Byte offset just past the last digit.
    pub end: usize,
    pub value: f64,
}

/// En dash, em dash and minus sign all become `-`.
pub fn normalize_dashes(text: &str) -> String {
    text.replace(['\u{2013}', '\u{2014}', '\u{2212}'], "-")
}

/// First signed-or-unsigned decimal in the cell: `"9.4 g/dL"` → 9.4, `"<200"` → 200.
pub fn parse_numeric_value(cell: Option<&str>) -> Option<f64> {
    let text = normalize_dashes(cell?);
    SIGNED_NUMBER
        .find(&text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// First two decimals in the cell as `(low, high)`, in printed order.
///
/// `"12-15 g/dL"` → (12, 15), `"3.5 – 5.5"` → (3.5, 5.5). Fewer than two numbers → `None`.
pub fn parse_numeric_range(cell: Option<&str>) -> Option<(f64, f64)> {
    let text = normalize_dashes(cell?);
    let mut numbers = NUMBER
        .find_iter(&text)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    let low = numbers.next()?;
    let high = numbers.next()?;
    Some((low, high))
}

/// Every number in a line, left to right.
///
/// A leading `-` is a sign unless the last non-space character before it is a
/// digit (`12-15` and `70 -110` are ranges, not 12 and -15). Digits glued to
/// letters (`B12`, `HbA1c`) belong to the word and are skipped.
pub fn find_numbers(line: &str) -> Vec<NumberMatch> {
    NUMBER
        .find_iter(line)
        .filter_map(|m| {
            let before = &line[..m.start()];
            let prev = before.chars().next_back();
            if prev.is_some_and(|c| c.is_alphabetic()) {
                return None;
            }

            let mut start = m.start();
            let mut text = m.as_str().to_string();
            if prev == Some('-') {
                let sign_at = m.start() - 1;
                let before_sign = line[..sign_at].trim_end().chars().next_back();
                if !before_sign.is_some_and(|c| c.is_ascii_digit()) {
                    start = sign_at;
                    text.insert(0, '-');
                }
            }

            text.parse::<f64>().ok().map(|value| NumberMatch {
                start,
                end: m.end(),
                value,
            })
        })
        .collect()
}

/// Trim and collapse whitespace in a unit cell; fill an empty unit from the
/// default-unit table.
pub fn clean_unit(test_name: &str, raw_unit: &str, reference: &ReferenceTables) -> String {
    let unit = WHITESPACE_RUN.replace_all(raw_unit.trim(), " ").into_owned();
    if !unit.is_empty() {
        return unit;
    }
    reference
        .default_unit_for(test_name)
        .map(str::to_string)
        .unwrap_or_default()
}
