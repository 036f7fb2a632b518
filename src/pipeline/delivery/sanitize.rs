use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Longest template parameter we send, in characters (before the ellipsis).
pub const MAX_TEMPLATE_PARAM_CHARS: usize = 400;

/// Make text safe for a message-template parameter: single line, single
/// spaces, at most [`MAX_TEMPLATE_PARAM_CHARS`] characters plus `...`.
pub fn sanitize_template_param(text: &str) -> String {
    let flat = text.replace(['\n', '\r', '\t'], " ");
    let cleaned = WHITESPACE_RUN.replace_all(&flat, " ");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > MAX_TEMPLATE_PARAM_CHARS {
        let cut: String = cleaned.chars().take(MAX_TEMPLATE_PARAM_CHARS).collect();
        format!("{cut}...")
    } else {
        cleaned.to_string()
    }
}
