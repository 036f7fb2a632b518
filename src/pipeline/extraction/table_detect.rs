use crate::models::{RawTable, RawTableRow};

use super::headers::map_headers;
use super::types::{ExtractionWarning, PageExtraction};

/// Number of lines at a page boundary checked for table patterns.
const BOUNDARY_LINES: usize = 3;

/// Minimum ratio of tabular lines needed to consider a boundary as tabular.
const TABULAR_THRESHOLD: f64 = 0.60;

/// Minimum rows (header included) for a run of row lines to count as a table.
const MIN_TABLE_ROWS: usize = 2;

/// Derive candidate tables from a page's text.
///
/// A line is a row when it splits into 2+ cells; consecutive rows form one
/// table and any other line ends it. A row that maps as a usable header
/// starts a new table, so a metadata line printed with wide gaps just above
/// the header (`Patient Name: Asha    Age: 45 Y`) cannot take the header slot.
pub fn detect_tables(text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: Vec<RawTableRow> = Vec::new();

    for line in text.lines() {
        match split_row(line) {
            Some(row) => {
                if !current.is_empty() && map_headers(&row).is_usable() {
                    flush(&mut current, &mut tables);
                }
                current.push(row);
            }
            None => flush(&mut current, &mut tables),
        }
    }
    flush(&mut current, &mut tables);

    tables
}

fn flush(current: &mut Vec<RawTableRow>, tables: &mut Vec<RawTable>) {
    if current.len() >= MIN_TABLE_ROWS {
        tables.push(RawTable::new(std::mem::take(current)));
    } else {
        current.clear();
    }
}

/// Split a line into cells on tabs, pipes, or runs of 2+ spaces.
///
/// Empty cells between separators (`| a || b |`) are kept as `None` so column
/// positions line up with the header. Returns `None` for lines with fewer
/// than two non-empty cells.
pub fn split_row(line: &str) -> Option<RawTableRow> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cells: Vec<&str> = if trimmed.contains('|') {
        trimmed.trim_matches('|').split('|').collect()
    } else if trimmed.contains('\t') {
        trimmed.split('\t').collect()
    } else {
        split_on_space_runs(trimmed)
    };

    let row: RawTableRow = cells
        .into_iter()
        .map(|c| {
            let c = c.trim();
            (!c.is_empty()).then(|| c.to_string())
        })
        .collect();

    if row.iter().flatten().count() >= 2 {
        Some(row)
    } else {
        None
    }
}

/// Split on runs of two or more spaces; single spaces stay inside a cell.
fn split_on_space_runs(text: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut cell_start = 0;
    let mut gap_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch == ' ' {
            gap_start.get_or_insert(i);
            continue;
        }
        if let Some(g) = gap_start.take() {
            if i - g >= 2 {
                cells.push(&text[cell_start..g]);
                cell_start = i;
            }
        }
    }
    cells.push(&text[cell_start..]);
    cells
}

/// Detect table continuation across page breaks and annotate pages.
///
/// Scans adjacent page pairs: if the last N lines of page K and the
/// first N lines of page K+1 both look tabular, adds a
/// `TableContinuation` warning to page K.
pub fn annotate_table_continuations(pages: &mut [PageExtraction]) {
    if pages.len() < 2 {
        return;
    }

    for i in 0..pages.len() - 1 {
        let tail_tabular = is_tail_tabular(&pages[i].text);
        let head_tabular = is_head_tabular(&pages[i + 1].text);

        if tail_tabular && head_tabular {
            let already = pages[i]
                .warnings
                .iter()
                .any(|w| matches!(w, ExtractionWarning::TableContinuation));
            if !already {
                pages[i].warnings.push(ExtractionWarning::TableContinuation);
            }
        }
    }
}

fn is_tail_tabular(text: &str) -> bool {
    let lines: Vec<&str> = text
        .lines()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(BOUNDARY_LINES)
        .collect();
    tabular_ratio(&lines) >= TABULAR_THRESHOLD
}

fn is_head_tabular(text: &str) -> bool {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(BOUNDARY_LINES)
        .collect();
    tabular_ratio(&lines) >= TABULAR_THRESHOLD
}

fn tabular_ratio(lines: &[&str]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let tabular = lines.iter().filter(|l| is_tabular_line(l)).count();
    tabular as f64 / lines.len() as f64
}

/// Heuristic: a line looks tabular if it has multiple columns separated by
/// tabs, pipes, or consistent multi-space gaps.
///
/// Patterns detected:
/// - Tab-separated: "Glucose\t88\tmg/dL"
/// - Pipe-separated: "Glucose | 88 | mg/dL"
/// - Multi-space aligned: "Potassium    4.2    mmol/L"
fn is_tabular_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 5 {
        return false;
    }

    if trimmed.matches('\t').count() >= 2 {
        return true;
    }

    if trimmed.matches('|').count() >= 2 {
        return true;
    }

    count_multi_space_gaps(trimmed) >= 2
}

/// Count runs of 3+ consecutive spaces that separate non-empty text segments.
fn count_multi_space_gaps(text: &str) -> usize {
    let mut count = 0;
    let mut in_gap = false;
    let mut gap_len = 0;

    for ch in text.chars() {
        if ch == ' ' {
            gap_len += 1;
            if gap_len >= 3 && !in_gap {
                in_gap = true;
                count += 1;
            }
        } else {
            in_gap = false;
            gap_len = 0;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_page(page_number: usize, text: &str) -> PageExtraction {
        PageExtraction::from_text(page_number, text)
    }

    fn has_continuation(page: &PageExtraction) -> bool {
        page.warnings
            .iter()
            .any(|w| matches!(w, ExtractionWarning::TableContinuation))
    }

    // --- split_row ---

    #[test]
    fn split_on_wide_spaces_keeps_single_spaces() {
        let row = split_row("Test Name    Result   Unit   Reference Range").unwrap();
        assert_eq!(
            row,
            vec![
                Some("Test Name".to_string()),
                Some("Result".to_string()),
                Some("Unit".to_string()),
                Some("Reference Range".to_string()),
            ]
        );
    }

    #[test]
    fn split_on_pipes_keeps_empty_cells() {
        let row = split_row("| Haemoglobin | 9.4 |  | 12 - 15 |").unwrap();
        assert_eq!(row.len(), 4);
        assert_eq!(row[2], None);
        assert_eq!(row[3].as_deref(), Some("12 - 15"));
    }

    #[test]
    fn split_on_tabs() {
        let row = split_row("Glucose\t88\tmg/dL\t70-110").unwrap();
        assert_eq!(row.len(), 4);
        assert_eq!(row[1].as_deref(), Some("88"));
    }

    #[test]
    fn prose_is_not_a_row() {
        assert!(split_row("Patient name: Asha Patil").is_none());
        assert!(split_row("").is_none());
        assert!(split_row("   |   |").is_none());
    }

    // --- detect_tables ---

    #[test]
    fn detects_single_table_between_prose() {
        let text = "City Diagnostics\n\
                    Test    Result    Unit    Range\n\
                    Glucose    88    mg/dL    70 - 110\n\
                    Urea    30    mg/dL    15 - 40\n\
                    End of report";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].header().unwrap()[0].as_deref(), Some("Test"));
    }

    #[test]
    fn metadata_line_above_header_is_not_the_header() {
        let text = "Patient Name: Asha Patil    Age: 45 Y\n\
                    Test Name    Result    Unit    Reference Range\n\
                    Haemoglobin    9.4    g/dL    12 - 15";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header().unwrap()[0].as_deref(), Some("Test Name"));
        assert_eq!(tables[0].data_rows().len(), 1);
    }

    #[test]
    fn repeated_header_starts_new_table() {
        let text = "Test  Result  Range\nUrea  30  15-40\nTest  Result  Range\nCreatinine  0.9  0.6-1.2";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].data_rows()[0][0].as_deref(), Some("Creatinine"));
    }

    #[test]
    fn blank_line_splits_tables() {
        let text = "A  1\nB  2\n\nC  3\nD  4";
        assert_eq!(detect_tables(text).len(), 2);
    }

    #[test]
    fn single_row_is_not_a_table() {
        assert!(detect_tables("Prose line\nK    4.2\nMore prose").is_empty());
    }

    // --- is_tabular_line ---

    #[test]
    fn tabular_line_patterns() {
        assert!(is_tabular_line("Name\tDose\tFrequency"));
        assert!(is_tabular_line("| K | 4.2 | mmol/L |"));
        assert!(is_tabular_line("Sodium       140    mmol/L    136-145"));
        assert!(!is_tabular_line("This is a normal sentence."));
        assert!(!is_tabular_line("Hi"));
    }

    #[test]
    fn counts_multi_space_gaps() {
        assert_eq!(count_multi_space_gaps("A   B   C"), 2);
        assert_eq!(count_multi_space_gaps("Hello   World"), 1);
        assert_eq!(count_multi_space_gaps("Hello World"), 0);
    }

    // --- annotate_table_continuations ---

    #[test]
    fn table_spanning_two_pages_flagged() {
        let mut pages = vec![
            make_page(1, "Header text\nPotassium\t4.2\tmmol/L\nSodium\t140\tmmol/L\nChloride\t102\tmmol/L"),
            make_page(2, "Creatinine\t0.9\tmg/dL\nUrea\t30\tmg/dL\nGlucose\t88\tmg/dL"),
        ];
        annotate_table_continuations(&mut pages);
        assert!(has_continuation(&pages[0]));
        assert!(!has_continuation(&pages[1]));
    }

    #[test]
    fn table_then_prose_not_flagged() {
        let mut pages = vec![
            make_page(1, "Potassium\t4.2\tmmol/L\nSodium\t140\tmmol/L\nChloride\t102\tmmol/L"),
            make_page(2, "Results verified.\nNo further action.\nSigned: Pathologist"),
        ];
        annotate_table_continuations(&mut pages);
        assert!(!has_continuation(&pages[0]));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let mut pages = vec![
            make_page(1, "Lab Results\nPotassium    4.2    mmol/L\nSodium       140    mmol/L\n\n\n"),
            make_page(2, "\nCreatinine   0.9    mg/dL\nUrea         30     mg/dL"),
        ];
        annotate_table_continuations(&mut pages);
        assert!(has_continuation(&pages[0]));
    }

    #[test]
    fn no_duplicate_annotations() {
        let mut pages = vec![
            make_page(1, "K\t4.2\tmmol/L\nNa\t140\tmmol/L\nCl\t102\tmmol/L"),
            make_page(2, "Ca\t9.4\tmg/dL\nMg\t2.0\tmg/dL\nP\t3.5\tmg/dL"),
        ];
        annotate_table_continuations(&mut pages);
        annotate_table_continuations(&mut pages);
        let count = pages[0]
            .warnings
            .iter()
            .filter(|w| matches!(w, ExtractionWarning::TableContinuation))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn single_page_no_annotation() {
        let mut pages = vec![make_page(1, "K\t4.2\tmmol/L\nNa\t140\tmmol/L")];
        annotate_table_continuations(&mut pages);
        assert!(pages[0].warnings.is_empty());
    }
}
