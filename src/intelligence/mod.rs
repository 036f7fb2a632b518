pub mod engine;
pub mod messages;
pub mod reference;
pub mod report;

pub use engine::*;
pub use messages::MessageTemplates;
pub use reference::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceDataError {
    #[error("Failed to read reference data {0}: {1}")]
    Load(String, String),

    #[error("Malformed reference data in {0}: {1}")]
    Parse(String, String),
}
