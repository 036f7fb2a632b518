use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};

use super::channel::{DeliveryReport, MessagingChannel};
use super::phone::format_phone_for_whatsapp;
use super::sanitize::sanitize_template_param;
use super::DeliveryError;
use crate::config::{WhatsAppSettings, MEDIA_TIMEOUT_SECS, MESSAGE_TIMEOUT_SECS};

const GRAPH_API_URL: &str = "https://graph.facebook.com";

/// Approved template with two body parameters: patient name, summary.
pub const SUMMARY_TEMPLATE: &str = "lab_summary_marathi";
const TEMPLATE_LANGUAGE: &str = "en";
const DEFAULT_PATIENT_NAME: &str = "Patient";

const AUDIO_FILENAME: &str = "summary.mp3";
const AUDIO_MIME: &str = "audio/mpeg";

#[derive(Deserialize)]
struct MediaUploadResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Option<Vec<MessageRef>>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: Option<String>,
}

/// WhatsApp Cloud API client.
///
/// Credentials are checked on each send; a client without them reports
/// failure without touching the network.
pub struct WhatsAppClient {
    settings: WhatsAppSettings,
    client: reqwest::blocking::Client,
    base_url: String,
}

impl WhatsAppClient {
    pub fn new(settings: WhatsAppSettings) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| DeliveryError::HttpClient(e.to_string()))?;

        Ok(Self {
            settings,
            client,
            base_url: GRAPH_API_URL.to_string(),
        })
    }

    /// `(token, phone_number_id)` or `MissingCredentials`.
    fn credentials(&self) -> Result<(&str, &str), DeliveryError> {
        match (
            self.settings.access_token.as_deref(),
            self.settings.phone_number_id.as_deref(),
        ) {
            (Some(token), Some(id)) if !token.is_empty() && !id.is_empty() => Ok((token, id)),
            _ => Err(DeliveryError::MissingCredentials),
        }
    }

    fn endpoint(&self, phone_number_id: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url, self.settings.api_version, phone_number_id, path
        )
    }

    fn map_send_error(&self, e: reqwest::Error, timeout_secs: u64) -> DeliveryError {
        if e.is_connect() {
            DeliveryError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            DeliveryError::HttpClient(format!("Request timed out after {timeout_secs}s"))
        } else {
            DeliveryError::HttpClient(e.to_string())
        }
    }

    fn try_send_template(
        &self,
        phone: &str,
        patient_name: Option<&str>,
        summary: &str,
    ) -> Result<DeliveryReport, DeliveryError> {
        let (token, phone_number_id) = self.credentials()?;
        let to = format_phone_for_whatsapp(phone);
        let payload = template_payload(&to, patient_name, summary);

        let response = self
            .client
            .post(self.endpoint(phone_number_id, "messages"))
            .bearer_auth(token)
            .timeout(Duration::from_secs(MESSAGE_TIMEOUT_SECS))
            .json(&payload)
            .send()
            .map_err(|e| self.map_send_error(e, MESSAGE_TIMEOUT_SECS))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = status.as_u16(), "WhatsApp template message sent");
        Ok(DeliveryReport::ok(format!(
            "Template message sent successfully (status {}).",
            status.as_u16()
        )))
    }

    fn try_send_audio(&self, phone: &str, audio: &[u8]) -> Result<DeliveryReport, DeliveryError> {
        let (token, phone_number_id) = self.credentials()?;

        let part = Part::bytes(audio.to_vec())
            .file_name(AUDIO_FILENAME)
            .mime_str(AUDIO_MIME)
            .map_err(|e| DeliveryError::HttpClient(e.to_string()))?;
        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .part("file", part);

        let upload = self
            .client
            .post(self.endpoint(phone_number_id, "media"))
            .bearer_auth(token)
            .timeout(Duration::from_secs(MEDIA_TIMEOUT_SECS))
            .multipart(form)
            .send()
            .map_err(|e| self.map_send_error(e, MEDIA_TIMEOUT_SECS))?;

        let status = upload.status();
        let body = upload.text().unwrap_or_default();
        let media_id = serde_json::from_str::<MediaUploadResponse>(&body)
            .ok()
            .and_then(|r| r.id);
        let media_id = match media_id {
            Some(id) if status.is_success() => id,
            _ => {
                return Err(DeliveryError::MediaUpload {
                    status: status.as_u16(),
                    body,
                })
            }
        };
        tracing::debug!(status = status.as_u16(), "Uploaded audio media");

        let to = format_phone_for_whatsapp(phone);
        let response = self
            .client
            .post(self.endpoint(phone_number_id, "messages"))
            .bearer_auth(token)
            .timeout(Duration::from_secs(MEDIA_TIMEOUT_SECS))
            .json(&audio_payload(&to, &media_id))
            .send()
            .map_err(|e| self.map_send_error(e, MEDIA_TIMEOUT_SECS))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        let queued = serde_json::from_str::<MessagesResponse>(&body)
            .ok()
            .and_then(|r| r.messages);

        match queued {
            Some(messages) if status.is_success() => {
                let msg_id = messages
                    .first()
                    .and_then(|m| m.id.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::info!(status = status.as_u16(), "WhatsApp audio message queued");
                Ok(DeliveryReport::ok(format!(
                    "Audio message queued to {to} (status {}, id={msg_id})",
                    status.as_u16()
                )))
            }
            _ => Err(DeliveryError::AudioMessage {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl MessagingChannel for WhatsAppClient {
    fn send_text_summary(
        &self,
        phone: &str,
        patient_name: Option<&str>,
        summary: &str,
    ) -> DeliveryReport {
        self.try_send_template(phone, patient_name, summary)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "WhatsApp template message failed");
                e.into()
            })
    }

    fn send_audio(&self, phone: &str, audio: &[u8]) -> DeliveryReport {
        self.try_send_audio(phone, audio).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "WhatsApp audio message failed");
            e.into()
        })
    }
}

/// Body of the summary template message. Parameters are sanitized here.
pub fn template_payload(to: &str, patient_name: Option<&str>, summary: &str) -> Value {
    let name = patient_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_PATIENT_NAME);

    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "template",
        "template": {
            "name": SUMMARY_TEMPLATE,
            "language": { "code": TEMPLATE_LANGUAGE },
            "components": [{
                "type": "body",
                "parameters": [
                    { "type": "text", "text": sanitize_template_param(name) },
                    { "type": "text", "text": sanitize_template_param(summary) },
                ],
            }],
        },
    })
}

/// Body of an audio message referencing uploaded media.
pub fn audio_payload(to: &str, media_id: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "audio",
        "audio": { "id": media_id },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> WhatsAppClient {
        WhatsAppClient::new(WhatsAppSettings {
            access_token: None,
            phone_number_id: Some("123".into()),
            api_version: "v22.0".into(),
        })
        .unwrap()
    }

    #[test]
    fn missing_credentials_fail_without_network() {
        let client = unconfigured();
        let report = client.send_text_summary("9876543210", Some("Asha"), "सारांश");
        assert!(!report.success);
        assert_eq!(report.message, "WhatsApp credentials are not set in environment variables.");

        let report = client.send_audio("9876543210", b"ID3");
        assert!(!report.success);
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let client = WhatsAppClient::new(WhatsAppSettings {
            access_token: Some(String::new()),
            phone_number_id: Some("123".into()),
            api_version: "v22.0".into(),
        })
        .unwrap();
        assert!(matches!(client.credentials(), Err(DeliveryError::MissingCredentials)));
    }

    #[test]
    fn endpoint_includes_version_and_sender() {
        let client = unconfigured();
        assert_eq!(
            client.endpoint("123", "messages"),
            "https://graph.facebook.com/v22.0/123/messages"
        );
    }

    #[test]
    fn template_payload_shape() {
        let body = template_payload("919876543210", None, "Line one.\nLine two.");
        assert_eq!(body["template"]["name"], "lab_summary_marathi");
        assert_eq!(body["template"]["language"]["code"], "en");
        let params = &body["template"]["components"][0]["parameters"];
        assert_eq!(params[0]["text"], "Patient");
        assert_eq!(params[1]["text"], "Line one. Line two.");
        assert_eq!(body["to"], "919876543210");
    }

    #[test]
    fn audio_payload_shape() {
        let body = audio_payload("919876543210", "media-1");
        assert_eq!(body["type"], "audio");
        assert_eq!(body["audio"]["id"], "media-1");
    }
}
