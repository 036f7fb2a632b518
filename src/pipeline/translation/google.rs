use std::time::Duration;

use serde_json::Value;

use super::backend::Translator;
use super::TranslationError;
use crate::config::{DEFAULT_TRANSLATE_CHUNK_CHARS, TRANSLATE_TIMEOUT_SECS};

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Language names accepted besides plain codes.
pub fn map_language(target_lang: &str) -> String {
    let lower = target_lang.trim().to_lowercase();
    match lower.as_str() {
        "mr" | "marathi" => "mr".to_string(),
        "hi" | "hindi" => "hi".to_string(),
        _ => lower,
    }
}

/// Client for the public Google Translate web endpoint.
///
/// Long texts are split at sentence boundaries and sent chunk by chunk;
/// chunk outputs are joined with a space.
pub struct GoogleTranslateBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout_secs: u64,
    max_chars_per_chunk: usize,
}

impl GoogleTranslateBackend {
    pub fn new(timeout_secs: u64, max_chars_per_chunk: usize) -> Result<Self, TranslationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: TRANSLATE_URL.to_string(),
            timeout_secs,
            max_chars_per_chunk,
        })
    }

    /// 10 s timeout, 800-character chunks.
    pub fn with_defaults() -> Result<Self, TranslationError> {
        Self::new(TRANSLATE_TIMEOUT_SECS, DEFAULT_TRANSLATE_CHUNK_CHARS)
    }

    fn translate_chunk(&self, text: &str, lang: &str) -> Result<String, TranslationError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    TranslationError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    TranslationError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    TranslationError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranslationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response
            .json()
            .map_err(|e| TranslationError::ResponseParsing(e.to_string()))?;

        parse_translation(&data)
    }
}

impl Translator for GoogleTranslateBackend {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let lang = map_language(target_lang);
        let chunks = chunk_text(text, self.max_chars_per_chunk);
        tracing::debug!(chunks = chunks.len(), lang = %lang, "Translating text");

        let mut out = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let translated =
                self.translate_chunk(chunk, &lang)
                    .map_err(|e| TranslationError::Chunk {
                        index,
                        source: Box::new(e),
                    })?;
            out.push(translated);
        }

        Ok(out.join(" "))
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["translated", "original", ...], ...], ...]`.
pub fn parse_translation(data: &Value) -> Result<String, TranslationError> {
    let segments = data
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ResponseParsing("missing segment list".into()))?;

    Ok(segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect())
}

/// Split at sentence ends followed by whitespace, packing sentences into
/// chunks of at most `max_chars` characters where possible.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return vec![String::new()];
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_after_terminators(text) {
        let len = sentence.chars().count();
        if current_len + len + 1 > max_chars && !current.is_empty() {
            chunks.push(current.trim().to_string());
            current.clear();
            current_len = 0;
        }
        current.push_str(sentence);
        current.push(' ');
        current_len += len + 1;
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

/// Pieces of `text` ending in `.`, `!` or `?` that are followed by whitespace.
fn split_after_terminators(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut in_gap = false;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if !in_gap && matches!(prev, Some('.' | '!' | '?')) {
                pieces.push(&text[start..i]);
                in_gap = true;
            }
        } else if in_gap {
            start = i;
            in_gap = false;
        }
        prev = Some(ch);
    }
    if !in_gap {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn language_aliases() {
        assert_eq!(map_language("Marathi"), "mr");
        assert_eq!(map_language("hindi"), "hi");
        assert_eq!(map_language("TA"), "ta");
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("  One. Two.  ", 800), vec!["One. Two."]);
    }

    #[test]
    fn chunks_respect_budget_at_sentence_ends() {
        let text = "Aaaa aaaa. Bbbb bbbb! Cccc cccc? Dddd.";
        let chunks = chunk_text(text, 22);
        assert_eq!(chunks, vec!["Aaaa aaaa. Bbbb bbbb!", "Cccc cccc? Dddd."]);
    }

    #[test]
    fn decimal_inside_sentence_does_not_split() {
        let pieces = split_after_terminators("Value 9.4 g/dL. Next one.");
        assert_eq!(pieces, vec!["Value 9.4 g/dL.", "Next one."]);
    }

    #[test]
    fn oversized_sentence_becomes_own_chunk() {
        let text = format!("Hi. {}. Bye.", "x".repeat(30));
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "Hi.");
        assert_eq!(chunks[2], "Bye.");
    }

    #[test]
    fn parses_segments() {
        let data = json!([[["नमस्कार. ", "Hello. ", null], ["__VAL_0__", "__VAL_0__"]], null, "en"]);
        assert_eq!(parse_translation(&data).unwrap(), "नमस्कार. __VAL_0__");
    }

    #[test]
    fn malformed_response_is_error() {
        let err = parse_translation(&json!({"error": "x"})).unwrap_err();
        assert!(matches!(err, TranslationError::ResponseParsing(_)));
    }

    #[test]
    fn blank_input_skips_network() {
        let backend = GoogleTranslateBackend::with_defaults().unwrap();
        assert_eq!(backend.translate("   ", "mr").unwrap(), "");
    }
}
