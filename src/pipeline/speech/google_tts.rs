use std::time::Duration;

use super::backend::SpeechBackend;
use super::SpeechError;
use crate::config::TTS_TIMEOUT_SECS;

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// `ttsspeed` values used by the web player.
const NORMAL_SPEED: &str = "1";
const SLOW_SPEED: &str = "0.3";

/// Client for the Google Translate text-to-speech endpoint. Returns MP3 bytes.
pub struct GoogleTtsBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout_secs: u64,
}

impl GoogleTtsBackend {
    pub fn new(timeout_secs: u64) -> Result<Self, SpeechError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SpeechError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: TTS_URL.to_string(),
            timeout_secs,
        })
    }

    pub fn with_defaults() -> Result<Self, SpeechError> {
        Self::new(TTS_TIMEOUT_SECS)
    }
}

impl SpeechBackend for GoogleTtsBackend {
    fn synthesize(&self, text: &str, lang: &str, slow: bool) -> Result<Vec<u8>, SpeechError> {
        let speed = if slow { SLOW_SPEED } else { NORMAL_SPEED };
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
                ("ttsspeed", speed),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SpeechError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    SpeechError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    SpeechError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SpeechError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| SpeechError::HttpClient(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(bytes.to_vec())
    }
}
