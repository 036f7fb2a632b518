//! Placeholder masking so a translation backend cannot touch numbers or units.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `70-110 mg/dL`, `3.5 – 5.1`: both endpoints plus an optional unit.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(\.\d+)?)\s*[-–]\s*(\d+(\.\d+)?)(\s*[a-zA-Z/%]+)?").unwrap()
});

/// `134 mg/dL`, `9.4 g/dL`, `38 %`: a number followed by a unit-like word.
/// The unit run is greedy, so no trailing word boundary is needed; `%` never has one.
static VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+(\.\d+)?)(\s*[a-zA-Z/%]+)").unwrap());

/// Placeholder → original substring, in the order masks were taken.
/// Lives for a single translation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskTable {
    entries: Vec<(String, String)>,
}

impl MaskTable {
    pub fn placeholder(index: usize) -> String {
        format!("__VAL_{index}__")
    }

    fn push(&mut self, original: &str) -> String {
        let key = Self::placeholder(self.entries.len());
        self.entries.push((key.clone(), original.to_string()));
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Put every original substring back in place of its placeholder.
    pub fn unmask(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (key, original)| acc.replace(key, original))
    }
}

/// Mask ranges first, then single values.
pub fn mask_numbers(text: &str) -> (String, MaskTable) {
    let mut table = MaskTable::default();
    let ranges_masked = RANGE_PATTERN
        .replace_all(text, |caps: &Captures| table.push(&caps[0]))
        .into_owned();
    let masked = VALUE_PATTERN
        .replace_all(&ranges_masked, |caps: &Captures| table.push(&caps[0]))
        .into_owned();
    (masked, table)
}
