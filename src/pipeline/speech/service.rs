use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::backend::SpeechBackend;
use super::formatter::chunk_for_tts;
use super::SpeechError;
use crate::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SPEECH_CHUNK_CHARS, DEFAULT_TARGET_LANG};
use crate::pipeline::translation::map_language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub lang: String,
    pub slow: bool,
    pub output_dir: PathBuf,
    pub max_chars_per_chunk: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_TARGET_LANG.to_string(),
            slow: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_chars_per_chunk: DEFAULT_SPEECH_CHUNK_CHARS,
        }
    }
}

/// Audio for one chunk. `index` is 1-based, in playback order.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub index: usize,
    pub text: String,
    pub audio: Vec<u8>,
}

/// Formats text, chunks it and synthesizes each chunk in order.
pub struct SpeechService {
    backend: Box<dyn SpeechBackend + Send + Sync>,
    config: SpeechConfig,
}

impl SpeechService {
    pub fn new(backend: Box<dyn SpeechBackend + Send + Sync>, config: SpeechConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Synthesize every chunk in memory. Any failing or empty chunk fails the call.
    pub fn synthesize_chunks(&self, text: &str) -> Result<Vec<AudioSegment>, SpeechError> {
        let lang = map_language(&self.config.lang);
        let chunks = chunk_for_tts(text, self.config.max_chars_per_chunk);
        tracing::info!(chunks = chunks.len(), lang = %lang, "Synthesizing speech");

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let audio = self
                    .backend
                    .synthesize(&chunk, &lang, self.config.slow)
                    .and_then(|bytes| {
                        if bytes.is_empty() {
                            Err(SpeechError::EmptyAudio)
                        } else {
                            Ok(bytes)
                        }
                    })
                    .map_err(|e| SpeechError::Chunk {
                        index: i,
                        source: Box::new(e),
                    })?;
                Ok(AudioSegment {
                    index: i + 1,
                    text: chunk,
                    audio,
                })
            })
            .collect()
    }

    /// Synthesize and write `{prefix}_{n}_{id}.mp3` files into the output directory.
    pub fn write_files(&self, text: &str, prefix: &str) -> Result<Vec<PathBuf>, SpeechError> {
        let segments = self.synthesize_chunks(text)?;
        write_segments(&self.config.output_dir, &segments, prefix)
    }
}

/// Write already-synthesized segments, creating `dir` if needed.
pub fn write_segments(
    dir: &Path,
    segments: &[AudioSegment],
    prefix: &str,
) -> Result<Vec<PathBuf>, SpeechError> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(segments.len());
    for segment in segments {
        let unique = Uuid::new_v4().simple().to_string();
        let name = format!("{prefix}_{}_{}.mp3", segment.index, &unique[..8]);
        let path = dir.join(name);
        std::fs::write(&path, &segment.audio)?;
        paths.push(path);
    }

    tracing::info!(files = paths.len(), dir = %dir.display(), "Wrote audio files");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::speech::backend::MockSpeechBackend;

    fn service(backend: MockSpeechBackend, dir: &Path, max_chars: usize) -> SpeechService {
        SpeechService::new(
            Box::new(backend),
            SpeechConfig {
                lang: "marathi".into(),
                output_dir: dir.to_path_buf(),
                max_chars_per_chunk: max_chars,
                ..SpeechConfig::default()
            },
        )
    }

    struct SilentBackend;

    impl SpeechBackend for SilentBackend {
        fn synthesize(&self, _: &str, _: &str, _: bool) -> Result<Vec<u8>, SpeechError> {
            Ok(vec![])
        }
    }

    #[test]
    fn chunks_synthesized_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(MockSpeechBackend::new(), dir.path(), 22);
        let segments = svc.synthesize_chunks("Aaaa aaaa. Bbbb bbbb. Cccc 1.5.").unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].text, "Cccc 1 point 5.");
        assert!(segments[1].audio.ends_with("mr:Cccc 1 point 5.".as_bytes()));
    }

    #[test]
    fn failing_chunk_reports_index() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(MockSpeechBackend::failing_on(1), dir.path(), 12);
        let err = svc.synthesize_chunks("One one. Two two. Three.").unwrap_err();
        assert!(matches!(err, SpeechError::Chunk { index: 1, .. }));
    }

    #[test]
    fn empty_audio_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = SpeechService::new(
            Box::new(SilentBackend),
            SpeechConfig {
                output_dir: dir.path().to_path_buf(),
                ..SpeechConfig::default()
            },
        );
        let err = svc.synthesize_chunks("Hello.").unwrap_err();
        assert!(err.to_string().contains("no audio"));
    }

    #[test]
    fn writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let svc = service(MockSpeechBackend::new(), &out, 220);

        let paths = svc.write_files("Namaskar. Report ready.", "lab_explanation").unwrap();
        assert_eq!(paths.len(), 1);

        let name = paths[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lab_explanation_1_"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(name.len(), "lab_explanation_1_".len() + 8 + ".mp3".len());
        assert!(std::fs::read(&paths[0]).unwrap().starts_with(b"ID3"));
    }

    #[test]
    fn nothing_to_say_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(MockSpeechBackend::new(), dir.path(), 220);
        assert!(svc.write_files("  ", "x").unwrap().is_empty());
    }
}
