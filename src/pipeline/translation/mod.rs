pub mod backend;
pub mod glossary;
pub mod google;
pub mod masking;
pub mod orchestrator;
pub mod reflow;

pub use backend::*;
pub use google::*;
pub use masking::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Translation service is not reachable at {0}")]
    Connection(String),

    #[error("Translation service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Translation failed for chunk {index}: {source}")]
    Chunk {
        index: usize,
        #[source]
        source: Box<TranslationError>,
    },

    #[error("Translation backend failed: {0}")]
    Backend(String),
}
