use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::DeliveryError;

/// Outcome of one delivery attempt. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub success: bool,
    pub message: String,
}

impl DeliveryReport {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<DeliveryError> for DeliveryReport {
    fn from(err: DeliveryError) -> Self {
        Self::failed(err.to_string())
    }
}

/// Patient-facing messaging channel (allows mocking for tests).
pub trait MessagingChannel {
    /// Send the localized summary as a text message.
    fn send_text_summary(
        &self,
        phone: &str,
        patient_name: Option<&str>,
        summary: &str,
    ) -> DeliveryReport;

    /// Send an MP3 voice note.
    fn send_audio(&self, phone: &str, audio: &[u8]) -> DeliveryReport;
}

/// A message captured by [`MockMessagingChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text { phone: String, summary: String },
    Audio { phone: String, bytes: usize },
}

/// Mock channel for testing: records messages, optionally rejects everything.
pub struct MockMessagingChannel {
    reject_with: Option<String>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MockMessagingChannel {
    pub fn accepting() -> Self {
        Self {
            reject_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, message: SentMessage) -> DeliveryReport {
        if let Some(reason) = &self.reject_with {
            return DeliveryReport::failed(reason.clone());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        DeliveryReport::ok("queued")
    }
}

impl MessagingChannel for MockMessagingChannel {
    fn send_text_summary(
        &self,
        phone: &str,
        _patient_name: Option<&str>,
        summary: &str,
    ) -> DeliveryReport {
        self.record(SentMessage::Text {
            phone: phone.to_string(),
            summary: summary.to_string(),
        })
    }

    fn send_audio(&self, phone: &str, audio: &[u8]) -> DeliveryReport {
        self.record(SentMessage::Audio {
            phone: phone.to_string(),
            bytes: audio.len(),
        })
    }
}
