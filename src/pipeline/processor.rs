//! Report processing orchestrator.
//!
//! Single entry point that drives the full pipeline:
//! extract → evaluate → compose → translate → speech.
//! Delivery is a separate step over the finished report.
//!
//! Uses trait-based DI for every external engine (PDF reader, translator,
//! speech backend, messaging channel) so the orchestrator remains fully
//! testable with mock implementations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::intelligence::{compose_explanation, ClassificationThresholds, ExplanationEngine, ReferenceTables};
use crate::models::{LabTestResult, ReportEvaluation};
use crate::pipeline::delivery::{extract_phone_numbers, DeliveryReport, MessagingChannel};
use crate::pipeline::diagnostic::{
    dump_dir_for, dump_json, dump_text, ENGLISH_TEXT_FILE, EVALUATION_FILE,
    EXTRACTED_RECORDS_FILE, LOCALIZED_TEXT_FILE,
};
use crate::pipeline::extraction::{
    ExtractionError, ExtractionOutcome, ExtractionStrategy, LabReportExtractor, PageExtraction,
    PageWarning, PdfExtractor,
};
use crate::pipeline::speech::{write_segments, AudioSegment, SpeechBackend, SpeechConfig, SpeechService};
use crate::pipeline::translation::{MedicalTranslator, TranslationConfig, Translator};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that stop a run. Translation and speech failures do not: they are
/// recorded on the report instead.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// `empty_pages` counts pages with no text layer; when it equals `pages`
    /// the document is most likely a scan.
    #[error("No lab values were found in the document ({empty_pages} of {pages} pages had no text)")]
    NoDataFound { pages: usize, empty_pages: usize },
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    pub run_id: Uuid,
    pub records: Vec<LabTestResult>,
    pub strategy: ExtractionStrategy,
    /// Extraction diagnostics (empty pages, unusable tables, continuations).
    pub warnings: Vec<PageWarning>,
    pub evaluation: ReportEvaluation,
    pub english_text: String,
    /// Translated text, or the English text when translation failed.
    pub localized_text: String,
    pub translation_error: Option<String>,
    #[serde(skip)]
    pub audio: Vec<AudioSegment>,
    pub audio_files: Vec<PathBuf>,
    pub speech_error: Option<String>,
    /// Mobile numbers found anywhere in the document text.
    pub phone_numbers: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ProcessedReport {
    pub fn is_translated(&self) -> bool {
        self.translation_error.is_none()
    }

    /// All segments back to back as one MP3 stream.
    pub fn combined_audio(&self) -> Vec<u8> {
        self.audio.iter().flat_map(|s| s.audio.iter().copied()).collect()
    }
}

/// Result of sending a report to one recipient.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub text: DeliveryReport,
    pub audio: DeliveryReport,
}

/// Knobs for a processor instance.
#[derive(Debug, Clone, Default)]
pub struct ProcessorSettings {
    pub translation: TranslationConfig,
    pub speech: SpeechConfig,
    pub thresholds: ClassificationThresholds,
    /// Write synthesized audio into `speech.output_dir`.
    pub write_audio_files: bool,
    /// Base directory for diagnostic dumps; `None` disables them.
    pub dump_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Orchestrates one lab report run.
///
/// Pure pipeline logic with trait-based DI. Does not print or prompt; that
/// belongs to the CLI.
pub struct ReportProcessor<'a> {
    extractor: LabReportExtractor<'a>,
    engine: ExplanationEngine<'a>,
    translator: MedicalTranslator<'a>,
    speech: Option<SpeechService>,
    write_audio_files: bool,
    dump_dir: Option<PathBuf>,
}

impl<'a> ReportProcessor<'a> {
    /// `speech_backend = None` skips audio entirely.
    pub fn new(
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        translator: Box<dyn Translator + Send + Sync>,
        speech_backend: Option<Box<dyn SpeechBackend + Send + Sync>>,
        reference: &'a ReferenceTables,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            extractor: LabReportExtractor::new(pdf_extractor, reference),
            engine: ExplanationEngine::new(reference).with_thresholds(settings.thresholds),
            translator: MedicalTranslator::new(translator, settings.translation, reference),
            speech: speech_backend.map(|b| SpeechService::new(b, settings.speech)),
            write_audio_files: settings.write_audio_files,
            dump_dir: settings.dump_dir,
        }
    }

    /// Full pipeline from PDF bytes.
    pub fn process_pdf(&self, pdf_bytes: &[u8]) -> Result<ProcessedReport, ProcessingError> {
        let extraction = self.extractor.extract(pdf_bytes)?;
        self.process_extraction(extraction)
    }

    /// Full pipeline from pages already read (skips the PDF reader).
    pub fn process_pages(&self, pages: Vec<PageExtraction>) -> Result<ProcessedReport, ProcessingError> {
        let extraction = self.extractor.extract_pages(pages);
        self.process_extraction(extraction)
    }

    fn process_extraction(
        &self,
        extraction: ExtractionOutcome,
    ) -> Result<ProcessedReport, ProcessingError> {
        if extraction.is_empty() {
            let pages = extraction.pages.len();
            let empty_pages = extraction.empty_page_count();
            tracing::warn!(pages, empty_pages, "No lab values found");
            return Err(ProcessingError::NoDataFound { pages, empty_pages });
        }

        let run_id = Uuid::new_v4();
        let dump = dump_dir_for(self.dump_dir.as_deref(), &run_id);
        if let Some(dir) = &dump {
            dump_json(dir, EXTRACTED_RECORDS_FILE, &extraction.records);
        }

        let phone_numbers = extract_phone_numbers(&extraction.full_text);
        let warnings = extraction.warnings();
        let records = extraction.records.clone();

        // Step 1: Evaluate
        let evaluation = self.engine.evaluate_report(extraction.records);
        let english_text = compose_explanation(&evaluation);
        if let Some(dir) = &dump {
            dump_json(dir, EVALUATION_FILE, &evaluation);
            dump_text(dir, ENGLISH_TEXT_FILE, &english_text);
        }

        // Step 2: Translate (failure keeps English)
        let (localized_text, translation_error) =
            match self.translator.translate_explanation(&english_text) {
                Ok(text) => (text, None),
                Err(e) => {
                    tracing::warn!(error = %e, "Translation failed, keeping English text");
                    (english_text.clone(), Some(e.to_string()))
                }
            };
        if let Some(dir) = &dump {
            dump_text(dir, LOCALIZED_TEXT_FILE, &localized_text);
        }

        // Step 3: Speech (failure keeps text only)
        let mut audio = Vec::new();
        let mut audio_files = Vec::new();
        let mut speech_error = None;
        if let Some(speech) = &self.speech {
            let result = speech.synthesize_chunks(&localized_text).and_then(|segments| {
                if self.write_audio_files {
                    audio_files = write_segments(
                        &speech.config().output_dir,
                        &segments,
                        &format!("lab_explanation_{}", run_id.simple()),
                    )?;
                }
                Ok(segments)
            });
            match result {
                Ok(segments) => audio = segments,
                Err(e) => {
                    tracing::warn!(error = %e, "Speech synthesis failed");
                    speech_error = Some(e.to_string());
                }
            }
        }

        tracing::info!(
            run_id = %run_id,
            records = records.len(),
            translated = translation_error.is_none(),
            audio_segments = audio.len(),
            phones = phone_numbers.len(),
            "Report processed"
        );

        Ok(ProcessedReport {
            run_id,
            records,
            strategy: extraction.strategy,
            warnings,
            evaluation,
            english_text,
            localized_text,
            translation_error,
            audio,
            audio_files,
            speech_error,
            phone_numbers,
            generated_at: Utc::now(),
        })
    }
}

/// Send a processed report's text and audio to one recipient.
///
/// Both messages are attempted independently; neither failure stops the other.
pub fn deliver(
    report: &ProcessedReport,
    channel: &dyn MessagingChannel,
    phone: &str,
    patient_name: Option<&str>,
) -> DeliveryOutcome {
    let text = channel.send_text_summary(phone, patient_name, &report.localized_text);

    let audio_bytes = report.combined_audio();
    let audio = if audio_bytes.is_empty() {
        DeliveryReport::failed("Audio was not generated.")
    } else {
        channel.send_audio(phone, &audio_bytes)
    };

    tracing::info!(
        text_sent = text.success,
        audio_sent = audio.success,
        "Delivery attempted"
    );

    DeliveryOutcome { text, audio }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
