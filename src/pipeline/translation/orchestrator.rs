use serde::{Deserialize, Serialize};

use super::backend::Translator;
use super::glossary::apply_glossary;
use super::masking::mask_numbers;
use super::reflow::reflow_sentences;
use super::TranslationError;
use crate::config::{DEFAULT_MAX_SENTENCE_LEN, DEFAULT_TARGET_LANG};
use crate::intelligence::ReferenceTables;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub target_lang: String,
    /// Sentences longer than this get a line break after them.
    pub max_sentence_len: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            max_sentence_len: DEFAULT_MAX_SENTENCE_LEN,
        }
    }
}

impl TranslationConfig {
    pub fn for_language(target_lang: &str) -> Self {
        Self {
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }
}

/// Translates patient explanations without letting the backend alter numbers.
///
/// Steps: mask numbers and units, translate, apply glossary, unmask, reflow.
pub struct MedicalTranslator<'a> {
    backend: Box<dyn Translator + Send + Sync>,
    config: TranslationConfig,
    reference: &'a ReferenceTables,
}

impl<'a> MedicalTranslator<'a> {
    pub fn new(
        backend: Box<dyn Translator + Send + Sync>,
        config: TranslationConfig,
        reference: &'a ReferenceTables,
    ) -> Self {
        Self {
            backend,
            config,
            reference,
        }
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn translate_explanation(&self, english_text: &str) -> Result<String, TranslationError> {
        self.translate_explanation_to(english_text, &self.config.target_lang)
    }

    /// Same pipeline with a per-call target language.
    pub fn translate_explanation_to(
        &self,
        english_text: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let (masked, masks) = mask_numbers(english_text);

        let raw = self.backend.translate(&masked, target_lang)?;

        let glossed = apply_glossary(english_text, &raw, target_lang, self.reference.glossary());
        let unmasked = masks.unmask(&glossed);
        let text = reflow_sentences(&unmasked, self.config.max_sentence_len);

        tracing::info!(
            lang = %target_lang,
            masked = masks.len(),
            input_chars = english_text.chars().count(),
            output_chars = text.chars().count(),
            "Translation complete"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::translation::backend::{EchoTranslator, MockTranslator};

    fn translator(backend: Box<dyn Translator + Send + Sync>, tables: &ReferenceTables) -> MedicalTranslator<'_> {
        MedicalTranslator::new(backend, TranslationConfig::default(), tables)
    }

    #[test]
    fn numbers_survive_changed_prose() {
        let tables = ReferenceTables::builtin();
        let mock = MockTranslator::with_replacements(&[
            ("Your", "तुमचे"),
            ("which is higher than the usual healthy range", "जे नेहमीच्या मर्यादेपेक्षा जास्त आहे"),
        ]);
        let t = translator(Box::new(mock), &tables);

        let english = "Your fasting blood sugar is 134 mg/dL, which is higher than the usual healthy range (70-110 mg/dL).";
        let out = t.translate_explanation(english).unwrap();

        assert!(out.starts_with("तुमचे fasting blood sugar is 134 mg/dL, जे"));
        assert!(out.contains("(70-110 mg/dL)."));
        assert!(out.ends_with("उपासाचा रक्तातील साखर"));
        assert!(!out.contains("__VAL_"));
    }

    #[test]
    fn percent_values_survive_digit_rewriting_backend() {
        let tables = ReferenceTables::builtin();
        let mock = MockTranslator::with_replacements(&[("3", "३"), ("4", "४"), ("5", "५"), ("8", "८")]);
        let t = translator(Box::new(mock), &tables);

        let out = t
            .translate_explanation("Your PCV is 38 %, which is lower than the usual healthy range (40-50 %).")
            .unwrap();

        assert!(out.contains("Your PCV is 38 %,"));
        assert!(out.contains("(40-50 %)."));
        assert!(!out.contains('३') && !out.contains('८'));
        assert!(!out.contains("__VAL_"));
    }

    #[test]
    fn echo_backend_keeps_decimals_intact() {
        let tables = ReferenceTables::builtin();
        let t = translator(Box::new(EchoTranslator), &tables);
        let out = t
            .translate_explanation("Your value is 9.4 g/dL. Range 12-15 g/dL.")
            .unwrap();
        assert_eq!(out, "[mr MT HERE] Your value is 9.4 g/dL. Range 12-15 g/dL.");
    }

    #[test]
    fn backend_error_propagates() {
        let tables = ReferenceTables::builtin();
        let t = translator(Box::new(MockTranslator::failing("503")), &tables);
        assert!(matches!(
            t.translate_explanation("Anything 5 mg."),
            Err(TranslationError::Backend(_))
        ));
    }

    #[test]
    fn long_sentences_break_lines() {
        let tables = ReferenceTables::builtin();
        let config = TranslationConfig {
            max_sentence_len: 15,
            ..TranslationConfig::for_language("hi")
        };
        let t = MedicalTranslator::new(Box::new(MockTranslator::identity()), config, &tables);
        let out = t
            .translate_explanation("This sentence is rather long. Short.")
            .unwrap();
        assert_eq!(out, "This sentence is rather long.\nShort.");
    }

    #[test]
    fn per_call_language_overrides_config() {
        let tables = ReferenceTables::builtin();
        let t = translator(Box::new(EchoTranslator), &tables);
        let out = t.translate_explanation_to("Glucose 88 mg/dL.", "hi").unwrap();
        assert_eq!(out, "[hi MT HERE] Glucose 88 mg/dL.");
        assert_eq!(t.config().target_lang, "mr");
    }
}
