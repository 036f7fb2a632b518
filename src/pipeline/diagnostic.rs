//! Pipeline diagnostic dump: writes intermediate artifacts to disk.
//!
//! Lets every stage of a run be inspected after the fact: extracted records,
//! evaluation, English text, localized text.
//!
//! **Activation**: disabled unless a dump directory is configured
//! (`LABBOT_DUMP_DIR`, see `AppConfig`).
//!
//! **Output structure**:
//! ```text
//! {dump_dir}/{run_id}/
//!   01-extracted-records.json
//!   02-evaluation.json
//!   03-english.txt
//!   04-localized.txt
//! ```

use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const EXTRACTED_RECORDS_FILE: &str = "01-extracted-records.json";
pub const EVALUATION_FILE: &str = "02-evaluation.json";
pub const ENGLISH_TEXT_FILE: &str = "03-english.txt";
pub const LOCALIZED_TEXT_FILE: &str = "04-localized.txt";

/// Returns the dump directory for a run, or `None` if diagnostics are disabled.
///
/// Creates the directory tree. Returns `None` (with a warning) if directory
/// creation fails: never panics, never blocks the pipeline.
pub fn dump_dir_for(base: Option<&Path>, run_id: &Uuid) -> Option<PathBuf> {
    let dir = base?.join(run_id.to_string());

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Diagnostic dump: failed to create directory"
        );
        return None;
    }

    Some(dir)
}

/// Write a JSON artifact (any serde-serializable value).
///
/// Uses pretty-printing for human readability. Never panics.
pub fn dump_json<T: serde::Serialize>(dir: &Path, filename: &str, value: &T) {
    let path = dir.join(filename);
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(&path, json.as_bytes()) {
            Ok(()) => tracing::debug!(
                path = %path.display(),
                size = json.len(),
                "Diagnostic dump: JSON written"
            ),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Diagnostic dump: failed to write JSON"
            ),
        },
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Diagnostic dump: failed to serialize JSON"
        ),
    }
}

/// Write a text artifact. Never panics.
pub fn dump_text(dir: &Path, filename: &str, text: &str) {
    let path = dir.join(filename);
    match std::fs::write(&path, text.as_bytes()) {
        Ok(()) => tracing::debug!(
            path = %path.display(),
            size = text.len(),
            "Diagnostic dump: text written"
        ),
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Diagnostic dump: failed to write text"
        ),
    }
}
