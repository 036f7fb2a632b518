use super::types::{PageExtraction, PdfExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; tables come from the
/// text-strategy detector.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
        let page_texts = read_pages(pdf_bytes)?;

        Ok(page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageExtraction::from_text(i + 1, text))
            .collect())
    }
}

/// pdf-extract panics on some malformed files; those become parse errors.
fn read_pages(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes))
        .map_err(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(error = %message, "PDF reader panicked");
            ExtractionError::PdfParsing(format!("malformed PDF: {message}"))
        })?
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fixed page texts, for tests and dry runs.
pub struct MockPdfExtractor {
    pages: Vec<String>,
}

impl MockPdfExtractor {
    pub fn with_pages(pages: Vec<&str>) -> Self {
        Self {
            pages: pages.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { pages: vec![] }
    }
}

impl PdfExtractor for MockPdfExtractor {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageExtraction::from_text(i + 1, text.as_str()))
            .collect())
    }
}
