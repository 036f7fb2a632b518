use crate::intelligence::GlossaryEntry;

/// Force controlled terminology into a translation.
///
/// For each glossary phrase found in the English source (case-insensitive),
/// the phrase's target-language rendering is appended when the translation
/// does not already contain it. Placement is not attempted.
pub fn apply_glossary(
    original_en: &str,
    translated: &str,
    target_lang: &str,
    glossary: &[GlossaryEntry],
) -> String {
    let source = original_en.to_lowercase();
    let mut out = translated.to_string();

    for entry in glossary {
        if !source.contains(&entry.english.to_lowercase()) {
            continue;
        }
        let Some(desired) = entry.translations.get(target_lang) else {
            continue;
        };
        if desired.is_empty() || out.contains(desired.as_str()) {
            continue;
        }
        out.push(' ');
        out.push_str(desired);
    }

    out.trim().to_string()
}
