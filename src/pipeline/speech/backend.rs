use std::sync::Mutex;

use super::SpeechError;

/// Speech synthesis abstraction (allows mocking for tests).
///
/// Returns compressed audio (MP3) for one chunk of text.
pub trait SpeechBackend {
    fn synthesize(&self, text: &str, lang: &str, slow: bool) -> Result<Vec<u8>, SpeechError>;
}

/// Mock backend for testing: fake MP3 bytes derived from the text,
/// optionally failing on a given call.
pub struct MockSpeechBackend {
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl MockSpeechBackend {
    pub fn new() -> Self {
        Self {
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `n`-th call (0-based) with `EmptyAudio`.
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockSpeechBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechBackend for MockSpeechBackend {
    fn synthesize(&self, text: &str, lang: &str, _slow: bool) -> Result<Vec<u8>, SpeechError> {
        let call_index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(text.to_string());
                calls.len() - 1
            }
            Err(_) => 0,
        };
        if self.fail_on_call == Some(call_index) {
            return Err(SpeechError::EmptyAudio);
        }
        let mut audio = b"ID3".to_vec();
        audio.extend_from_slice(format!("{lang}:{text}").as_bytes());
        Ok(audio)
    }
}
