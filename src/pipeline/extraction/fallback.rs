//! Line-based fallback parser.
//!
//! Used only when no usable table produced a record. Each line is read on its
//! own as `name value [unit] ... low [-] high`; this is a lossy heuristic and
//! misses or misreads odd layouts.

use crate::intelligence::ReferenceTables;
use crate::models::{LabTestResult, ReferenceRange};

use super::normalize::{clean_unit, find_numbers, normalize_dashes};

/// Lines containing any of these are treated as leaked table headers.
pub const HEADER_KEYWORDS: &[&str] = &[
    "test",
    "parameter",
    "investigation",
    "result",
    "value",
    "reference",
    "normal",
    "unit",
];

/// Value, low and high.
const MIN_NUMBERS: usize = 3;

/// Parse every line of the document text; one record per accepted line.
pub fn parse_lines(full_text: &str, reference: &ReferenceTables) -> Vec<LabTestResult> {
    full_text
        .lines()
        .filter_map(|line| parse_line(line, reference))
        .collect()
}

/// Parse a single line, or `None` when it does not look like a result.
pub fn parse_line(line: &str, reference: &ReferenceTables) -> Option<LabTestResult> {
    let line = normalize_dashes(line.trim());
    if line.is_empty() {
        return None;
    }

    let lower = line.to_lowercase();
    if HEADER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }

    let numbers = find_numbers(&line);
    if numbers.len() < MIN_NUMBERS {
        return None;
    }

    let first = numbers[0];
    let name = line[..first.start].trim();
    if name.is_empty() {
        return None;
    }

    let value = first.value;
    let ReferenceRange { low, high } = ReferenceRange::new(
        numbers[numbers.len() - 2].value,
        numbers[numbers.len() - 1].value,
    )
    .ordered();

    if value == low && low == high {
        return None;
    }

    let raw_unit = &line[first.end..numbers[1].start];
    let unit = clean_unit(name, raw_unit, reference);

    tracing::debug!(test = %name, value, low, high, "Fallback parsed line");

    Some(LabTestResult::new(name, value, unit).with_range(low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<LabTestResult> {
        parse_line(line, &ReferenceTables::builtin())
    }

    #[test]
    fn typical_line() {
        let r = parse("Haemoglobin 9.4 g/dL 12 - 15").unwrap();
        assert_eq!(r.name, "Haemoglobin");
        assert_eq!(r.value, 9.4);
        assert_eq!(r.unit, "g/dL");
        assert_eq!(r.reference, Some(ReferenceRange::new(12.0, 15.0)));
    }

    #[test]
    fn hyphenated_range_without_spaces() {
        let r = parse("Fasting Blood Sugar 134 mg/dL 70-110").unwrap();
        assert_eq!(r.value, 134.0);
        assert_eq!(r.reference, Some(ReferenceRange::new(70.0, 110.0)));
    }

    #[test]
    fn hyphen_glued_to_high_bound_is_a_separator() {
        let r = parse("Glucose 88 mg/dL 70 -110").unwrap();
        assert_eq!(r.unit, "mg/dL");
        assert_eq!(r.reference, Some(ReferenceRange::new(70.0, 110.0)));
    }

    #[test]
    fn en_dash_range() {
        let r = parse("Potassium 4.2 mmol/L 3.5 \u{2013} 5.1").unwrap();
        assert_eq!(r.reference, Some(ReferenceRange::new(3.5, 5.1)));
    }

    #[test]
    fn reversed_range_is_swapped() {
        let r = parse("Urea 30 mg/dL 40 15").unwrap();
        assert_eq!(r.reference, Some(ReferenceRange::new(15.0, 40.0)));
    }

    #[test]
    fn last_two_numbers_are_the_range() {
        let r = parse("Platelets 250 x10^3/uL 150 - 450").unwrap();
        assert_eq!(r.value, 250.0);
        assert_eq!(r.reference, Some(ReferenceRange::new(150.0, 450.0)));
    }

    #[test]
    fn missing_unit_filled_from_defaults() {
        let r = parse("Haemoglobin 13.5 12 15").unwrap();
        assert_eq!(r.unit, "g/dL");
    }

    #[test]
    fn digits_inside_name_stay_in_name() {
        let r = parse("Vitamin B12 300 pg/mL 200 - 900").unwrap();
        assert_eq!(r.name, "Vitamin B12");
        assert_eq!(r.value, 300.0);
    }

    #[test]
    fn header_lines_are_skipped() {
        assert!(parse("Test Result Unit 1 2 3").is_none());
        assert!(parse("Normal values 10 20 30").is_none());
    }

    #[test]
    fn too_few_numbers() {
        assert!(parse("Glucose 88 mg/dL").is_none());
        assert!(parse("Date 12/03").is_none());
    }

    #[test]
    fn line_starting_with_number_has_no_name() {
        assert!(parse("12 14 16 18").is_none());
    }

    #[test]
    fn degenerate_equal_numbers_skipped() {
        assert!(parse("Page 1 of 1 1").is_none());
    }

    #[test]
    fn blank_lines_skipped() {
        assert!(parse("   ").is_none());
    }

    #[test]
    fn parses_many_lines_in_order() {
        let text = "City Lab\nGlucose 88 mg/dL 70-110\n\nUrea 30 mg/dL 15 - 40\nThank you";
        let records = parse_lines(text, &ReferenceTables::builtin());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Glucose", "Urea"]);
    }

    #[test]
    fn text_without_data_yields_nothing() {
        let text = "Patient: Asha\nReport pending\nPlease collect in 2 days";
        assert!(parse_lines(text, &ReferenceTables::builtin()).is_empty());
    }
}
