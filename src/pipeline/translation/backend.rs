use super::TranslationError;

/// Machine-translation backend abstraction (allows mocking for tests).
///
/// Implementations must pass `__VAL_n__` placeholders through unchanged.
pub trait Translator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError>;
}

/// Tags the text instead of translating it. Deterministic runs without a network.
pub struct EchoTranslator;

impl Translator for EchoTranslator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        Ok(format!("[{target_lang} MT HERE] {text}"))
    }
}

/// Mock translator for testing: word replacements or a scripted failure.
pub struct MockTranslator {
    replacements: Vec<(String, String)>,
    failure: Option<String>,
}

impl MockTranslator {
    /// Returns the input unchanged.
    pub fn identity() -> Self {
        Self {
            replacements: vec![],
            failure: None,
        }
    }

    /// Substring replacements applied in order, standing in for real translation.
    pub fn with_replacements(pairs: &[(&str, &str)]) -> Self {
        Self {
            replacements: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            failure: None,
        }
    }

    /// Every call fails with this message.
    pub fn failing(message: &str) -> Self {
        Self {
            replacements: vec![],
            failure: Some(message.to_string()),
        }
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str, _target_lang: &str) -> Result<String, TranslationError> {
        if let Some(message) = &self.failure {
            return Err(TranslationError::Backend(message.clone()));
        }
        Ok(self
            .replacements
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_tags_language() {
        let out = EchoTranslator.translate("Hello.", "mr").unwrap();
        assert_eq!(out, "[mr MT HERE] Hello.");
    }

    #[test]
    fn mock_replaces_words() {
        let mock = MockTranslator::with_replacements(&[("Your", "तुमचे"), ("is", "आहे")]);
        assert_eq!(mock.translate("Your __VAL_0__ is", "mr").unwrap(), "तुमचे __VAL_0__ आहे");
    }

    #[test]
    fn mock_failure() {
        let err = MockTranslator::failing("quota").translate("x", "mr").unwrap_err();
        assert!(err.to_string().contains("quota"));
    }
}
