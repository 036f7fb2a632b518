use crate::intelligence::ReferenceTables;
use crate::models::{ColumnRole, LabTestResult, RawTable, RawTableRow};

use super::fallback::parse_lines;
use super::headers::map_headers;
use super::normalize::{clean_unit, parse_numeric_range, parse_numeric_value};
use super::table_detect::annotate_table_continuations;
use super::types::{
    ExtractionOutcome, ExtractionStrategy, ExtractionWarning, PageExtraction, PdfExtractor,
};
use super::ExtractionError;

/// Lab report extractor: table path first, line fallback when tables yield nothing.
/// Uses a trait object for PDF access, enabling dependency injection.
pub struct LabReportExtractor<'a> {
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    reference: &'a ReferenceTables,
}

impl<'a> LabReportExtractor<'a> {
    pub fn new(
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        reference: &'a ReferenceTables,
    ) -> Self {
        Self {
            pdf_extractor,
            reference,
        }
    }

    /// Extract records and full text from PDF bytes.
    ///
    /// An outcome with no records is the "no data found" condition, not an error.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<ExtractionOutcome, ExtractionError> {
        tracing::info!(bytes = pdf_bytes.len(), "Starting lab report extraction");
        let pages = self.pdf_extractor.extract_text(pdf_bytes)?;
        Ok(self.extract_pages(pages))
    }

    /// Same as [`extract`](Self::extract) over pages already read.
    pub fn extract_pages(&self, mut pages: Vec<PageExtraction>) -> ExtractionOutcome {
        annotate_table_continuations(&mut pages);

        let mut records = Vec::new();
        for page in &mut pages {
            for (table_index, table) in page.tables.iter().enumerate() {
                match records_from_table(table, self.reference) {
                    Some(found) => records.extend(found),
                    None => page
                        .warnings
                        .push(ExtractionWarning::UnusableTable { table_index }),
                }
            }
        }

        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let strategy = if !records.is_empty() {
            ExtractionStrategy::Table
        } else {
            records = parse_lines(&full_text, self.reference);
            if records.is_empty() {
                ExtractionStrategy::None
            } else {
                ExtractionStrategy::LineFallback
            }
        };

        let outcome = ExtractionOutcome {
            records,
            full_text,
            strategy,
            pages,
        };

        for w in outcome.warnings() {
            match w.warning {
                ExtractionWarning::TableContinuation => tracing::debug!(
                    page = w.page_number,
                    warning = w.warning.as_str(),
                    "Table continues on next page"
                ),
                _ => tracing::warn!(
                    page = w.page_number,
                    warning = w.warning.as_str(),
                    "Extraction warning"
                ),
            }
        }

        tracing::info!(
            pages = outcome.pages.len(),
            tables = outcome.table_count(),
            records = outcome.records.len(),
            warnings = outcome.pages.iter().map(|p| p.warnings.len()).sum::<usize>(),
            strategy = outcome.strategy.as_str(),
            "Lab report extraction complete"
        );

        outcome
    }
}

/// Records from one candidate table, or `None` when its header row does not
/// locate name, value and reference range.
pub fn records_from_table(
    table: &RawTable,
    reference: &ReferenceTables,
) -> Option<Vec<LabTestResult>> {
    let mapping = map_headers(table.header()?);
    if !mapping.is_usable() {
        return None;
    }
    let name_idx = mapping.get(ColumnRole::TestName)?;
    let value_idx = mapping.get(ColumnRole::Value)?;
    let range_idx = mapping.get(ColumnRole::RefRange)?;

    let records = table
        .data_rows()
        .iter()
        .filter(|row| !is_blank_row(row))
        .filter_map(|row| {
            let name = cell(row, name_idx)?;
            let value_cell = cell(row, value_idx)?;
            let range_cell = cell(row, range_idx)?;
            let unit_cell = match mapping.get(ColumnRole::Unit) {
                Some(idx) => cell(row, idx)?,
                None => "",
            };

            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = parse_numeric_value(Some(value_cell))?;
            let (low, high) = parse_numeric_range(Some(range_cell))?;
            let unit = clean_unit(name, unit_cell, reference);

            Some(LabTestResult::new(name, value, unit).with_range(low, high))
        })
        .collect();

    Some(records)
}

/// Cell text by index. Out-of-bounds is `None` (row is malformed);
/// an empty cell reads as "".
fn cell(row: &RawTableRow, idx: usize) -> Option<&str> {
    row.get(idx).map(|c| c.as_deref().unwrap_or(""))
}

fn is_blank_row(row: &RawTableRow) -> bool {
    row.iter()
        .all(|c| c.as_deref().map_or(true, |s| s.trim().is_empty()))
}
