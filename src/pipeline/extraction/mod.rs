pub mod fallback;
pub mod headers;
pub mod normalize;
pub mod orchestrator;
pub mod pdf;
pub mod table_detect;
pub mod types;

pub use orchestrator::*;
pub use pdf::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}
