//! Text preparation for speech synthesis: spoken numbers, one sentence per
//! line, and length-bounded chunks.

use super::normalize::normalize_numbers_for_tts;
use crate::pipeline::translation::reflow::is_sentence_end;

/// Split into sentences ending in `.`, `!` or `?`, terminator included.
///
/// A `.` between two digits (`9.4`) never ends a sentence. Trailing text
/// without a terminator is its own sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if is_sentence_end(&chars, i) {
            let segment = current.trim();
            if !segment.is_empty() {
                sentences.push(format!("{segment}{ch}"));
            }
            current.clear();
        } else {
            current.push(ch);
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Spoken-number form, one sentence per line.
pub fn format_for_tts(text: &str) -> String {
    let normalized = normalize_numbers_for_tts(text);
    split_sentences(&normalized).join("\n")
}

/// Greedily pack formatted lines into chunks of at most `max_chars` characters.
///
/// A single line longer than the budget still forms its own chunk.
pub fn chunk_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let formatted = format_for_tts(text);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in formatted.split('\n') {
        let len = line.chars().count();
        // +1 for the newline
        if current_len + len + 1 > max_chars && !current.is_empty() {
            chunks.push(current.trim().to_string());
            current.clear();
            current_len = 0;
        }
        current.push_str(line);
        current.push('\n');
        current_len += len + 1;
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}
