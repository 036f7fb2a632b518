use std::sync::LazyLock;

use regex::Regex;

/// Indian mobile number, optionally prefixed with `+91`.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+91[-\s]*)?[6-9]\d{9}").unwrap());

const COUNTRY_CODE: &str = "91";
const TRUNK_PREFIX: char = '0';

/// Mobile numbers in `text`, first-seen order, exact duplicates dropped.
pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();
    for m in MOBILE_PATTERN.find_iter(text) {
        if !phones.iter().any(|p| p == m.as_str()) {
            phones.push(m.as_str().to_string());
        }
    }
    phones
}

/// Canonical digits for messaging: `+91 98765 43210` → `919876543210`.
///
/// Numbers that fit none of the known shapes are returned as bare digits.
pub fn format_phone_for_whatsapp(phone: &str) -> String {
    let mut digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with(TRUNK_PREFIX) {
        digits.remove(0);
    }
    if digits.starts_with(COUNTRY_CODE) && digits.len() == 12 {
        return digits;
    }
    if digits.len() == 10 {
        return format!("{COUNTRY_CODE}{digits}");
    }
    digits
}
