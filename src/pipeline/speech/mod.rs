pub mod backend;
pub mod formatter;
pub mod google_tts;
pub mod normalize;
pub mod service;

pub use backend::*;
pub use formatter::*;
pub use google_tts::*;
pub use service::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech service is not reachable at {0}")]
    Connection(String),

    #[error("Speech service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Speech service returned no audio")]
    EmptyAudio,

    #[error("Speech synthesis failed for chunk {index}: {source}")]
    Chunk {
        index: usize,
        #[source]
        source: Box<SpeechError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
