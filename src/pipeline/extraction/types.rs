use serde::{Deserialize, Serialize};

use super::table_detect::detect_tables;
use super::ExtractionError;
use crate::models::{LabTestResult, RawTable};

/// Per-page extraction result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageExtraction {
    pub page_number: usize,
    pub text: String,
    pub tables: Vec<RawTable>,
    pub warnings: Vec<ExtractionWarning>,
}

impl PageExtraction {
    /// Page built from plain text, with candidate tables detected from the text.
    pub fn from_text(page_number: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let tables = detect_tables(&text);
        let mut warnings = Vec::new();
        if text.trim().is_empty() {
            warnings.push(ExtractionWarning::EmptyPage);
        }
        Self {
            page_number,
            text,
            tables,
            warnings,
        }
    }
}

/// Diagnostics attached to a page. Never affect the extracted records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ExtractionWarning {
    /// Page carries no text layer (likely a scan).
    EmptyPage,
    /// A table seems to continue on the next page.
    TableContinuation,
    /// A table's header row did not map the required columns.
    UnusableTable { table_index: usize },
}

impl ExtractionWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPage => "empty_page",
            Self::TableContinuation => "table_continuation",
            Self::UnusableTable { .. } => "unusable_table",
        }
    }
}

/// A warning with the page it was raised on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageWarning {
    pub page_number: usize,
    pub warning: ExtractionWarning,
}

/// Which path produced the records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    Table,
    LineFallback,
    /// Neither path found anything.
    None,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::LineFallback => "line_fallback",
            Self::None => "none",
        }
    }
}

/// Records plus the document text they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub records: Vec<LabTestResult>,
    /// All pages' text, page order, newline-joined.
    pub full_text: String,
    pub strategy: ExtractionStrategy,
    pub pages: Vec<PageExtraction>,
}

impl ExtractionOutcome {
    /// The "no data found" condition.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }

    /// Every page warning, in page order.
    pub fn warnings(&self) -> Vec<PageWarning> {
        self.pages
            .iter()
            .flat_map(|p| {
                p.warnings.iter().map(|w| PageWarning {
                    page_number: p.page_number,
                    warning: w.clone(),
                })
            })
            .collect()
    }

    /// Pages without a text layer.
    pub fn empty_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.warnings.contains(&ExtractionWarning::EmptyPage))
            .count()
    }
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_detects_tables() {
        let page = PageExtraction::from_text(1, "Test  Result  Range\nUrea  30  15-40");
        assert_eq!(page.tables.len(), 1);
        assert!(page.warnings.is_empty());
    }

    #[test]
    fn blank_page_is_flagged() {
        let page = PageExtraction::from_text(2, "  \n ");
        assert!(page.tables.is_empty());
        assert_eq!(page.warnings, vec![ExtractionWarning::EmptyPage]);
    }

    #[test]
    fn outcome_counts_tables_across_pages() {
        let outcome = ExtractionOutcome {
            records: vec![],
            full_text: String::new(),
            strategy: ExtractionStrategy::None,
            pages: vec![
                PageExtraction::from_text(1, "A  1\nB  2"),
                PageExtraction::from_text(2, "C  3\nD  4\n\nE  5\nF  6"),
            ],
        };
        assert!(outcome.is_empty());
        assert_eq!(outcome.table_count(), 3);
    }

    #[test]
    fn warnings_are_tagged_with_page() {
        let mut second = PageExtraction::from_text(2, "Test  Result  Range\nUrea  30  15-40");
        second.warnings.push(ExtractionWarning::UnusableTable { table_index: 0 });
        let outcome = ExtractionOutcome {
            records: vec![],
            full_text: String::new(),
            strategy: ExtractionStrategy::None,
            pages: vec![PageExtraction::from_text(1, ""), second],
        };

        let warnings = outcome.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].page_number, 1);
        assert_eq!(warnings[0].warning.as_str(), "empty_page");
        assert_eq!(warnings[1].page_number, 2);
        assert_eq!(outcome.empty_page_count(), 1);
    }

    #[test]
    fn strategy_wire_names() {
        assert_eq!(ExtractionStrategy::LineFallback.as_str(), "line_fallback");
        let json = serde_json::to_string(&ExtractionStrategy::LineFallback).unwrap();
        assert_eq!(json, "\"line_fallback\"");
    }
}
