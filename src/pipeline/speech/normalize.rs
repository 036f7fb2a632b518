use std::sync::LazyLock;

use regex::{Captures, Regex};

static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\.(\d+)\b").unwrap());

/// Rewrite decimals for speech: `9.4` → `9 point 4`, `16.0` → `16`.
pub fn normalize_numbers_for_tts(text: &str) -> String {
    DECIMAL_PATTERN
        .replace_all(text, |caps: &Captures| {
            let int_part = &caps[1];
            let frac_part = &caps[2];
            if frac_part.chars().all(|c| c == '0') {
                int_part.to_string()
            } else {
                format!("{int_part} point {frac_part}")
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_spoken_with_point() {
        assert_eq!(normalize_numbers_for_tts("Hb is 9.4 g/dL"), "Hb is 9 point 4 g/dL");
    }

    #[test]
    fn zero_fraction_dropped() {
        assert_eq!(normalize_numbers_for_tts("16.0 and 2.00"), "16 and 2");
    }

    #[test]
    fn keeps_leading_zeros_of_fraction() {
        assert_eq!(normalize_numbers_for_tts("0.05"), "0 point 05");
    }

    #[test]
    fn sentence_end_after_number_untouched() {
        assert_eq!(normalize_numbers_for_tts("It is 140. 2 more."), "It is 140. 2 more.");
    }

    #[test]
    fn integers_and_ranges_untouched() {
        assert_eq!(normalize_numbers_for_tts("range 70-110 mg/dL"), "range 70-110 mg/dL");
    }
}
