pub mod channel;
pub mod phone;
pub mod sanitize;
pub mod whatsapp;

pub use channel::*;
pub use phone::*;
pub use sanitize::*;
pub use whatsapp::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("WhatsApp credentials are not set in environment variables.")]
    MissingCredentials,

    #[error("Messaging service is not reachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Error from WhatsApp API: {status} {body}")]
    Api { status: u16, body: String },

    #[error("Error uploading media (status {status}): {body}")]
    MediaUpload { status: u16, body: String },

    #[error("Error sending audio (status {status}): {body}")]
    AudioMessage { status: u16, body: String },
}
