//! Header mapper: arbitrary column headers → canonical roles.

use crate::models::{ColumnRole, HeaderMapping};

/// Keyword table, checked top to bottom for each header cell.
///
/// Precedence:
/// - a header cell takes the first role in this table whose keywords it contains
///   (so "Test Value" is a name column, "Normal Value" a value column);
/// - a role keeps the first column that claimed it, later matches are ignored.
pub const ROLE_KEYWORDS: &[(ColumnRole, &[&str])] = &[
    (ColumnRole::TestName, &["test", "parameter", "investigation", "name"]),
    (ColumnRole::Value, &["result", "value", "observed"]),
    (ColumnRole::Unit, &["unit", "units"]),
    (ColumnRole::RefRange, &["ref", "range", "normal"]),
];

/// Role a single header cell claims, if any (case-insensitive substring match).
pub fn role_for_header(header: &str) -> Option<ColumnRole> {
    let lower = header.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    ROLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(role, _)| *role)
}

/// Map a header row to column indices.
pub fn map_headers(headers: &[Option<String>]) -> HeaderMapping {
    let mut mapping = HeaderMapping::default();
    for (idx, header) in headers.iter().enumerate() {
        let Some(role) = header.as_deref().and_then(role_for_header) else {
            continue;
        };
        mapping.assign_if_empty(role, idx);
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    #[test]
    fn typical_lab_header() {
        let m = map_headers(&headers(&["Test Name", "Result", "Units", "Reference Range"]));
        assert_eq!(m.test_name, Some(0));
        assert_eq!(m.value, Some(1));
        assert_eq!(m.unit, Some(2));
        assert_eq!(m.ref_range, Some(3));
        assert!(m.is_usable());
    }

    #[test]
    fn synonyms_and_case() {
        let m = map_headers(&headers(&["INVESTIGATION", "Observed Value", "Bio. Ref. Interval"]));
        assert_eq!(m.test_name, Some(0));
        assert_eq!(m.value, Some(1));
        assert_eq!(m.ref_range, Some(2));
        assert_eq!(m.unit, None);
    }

    #[test]
    fn first_matching_column_wins() {
        let m = map_headers(&headers(&["Parameter", "Result", "Value", "Normal Range"]));
        assert_eq!(m.value, Some(1));
        assert_eq!(m.ref_range, Some(3));
    }

    #[test]
    fn earlier_role_in_table_takes_the_cell() {
        assert_eq!(role_for_header("Normal Value"), Some(ColumnRole::Value));
        assert_eq!(role_for_header("Test Result"), Some(ColumnRole::TestName));
        assert_eq!(role_for_header("Sample"), None);
    }

    #[test]
    fn empty_headers_are_skipped() {
        let m = map_headers(&headers(&["", "Test", "", "Result", "Range"]));
        assert_eq!(m.test_name, Some(1));
        assert_eq!(m.value, Some(3));
        assert_eq!(m.ref_range, Some(4));
    }

    #[test]
    fn header_without_range_is_not_usable() {
        let m = map_headers(&headers(&["Test", "Result", "Unit"]));
        assert!(!m.is_usable());
    }
}
