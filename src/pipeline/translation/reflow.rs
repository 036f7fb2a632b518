//! Sentence reflow for speech pacing.

/// Break after any sentence longer than `max_sentence_len` characters.
///
/// Sentences end at `.`, `!` or `?`; a `.` between two digits is part of a
/// number. Short sentences are joined with a space, long ones are followed by
/// a newline. Text after the last terminator is kept as is.
pub fn reflow_sentences(text: &str, max_sentence_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut rebuilt = String::with_capacity(text.len() + 8);
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        current.push(ch);
        if !is_sentence_end(&chars, i) {
            continue;
        }
        let sentence = current.trim();
        rebuilt.push_str(sentence);
        if sentence.chars().count() > max_sentence_len {
            rebuilt.push('\n');
        } else {
            rebuilt.push(' ');
        }
        current.clear();
    }
    rebuilt.push_str(&current);

    rebuilt.trim().to_string()
}

/// Whether `chars[i]` terminates a sentence.
pub(crate) fn is_sentence_end(chars: &[char], i: usize) -> bool {
    match chars[i] {
        '!' | '?' => true,
        '.' => !is_decimal_point(chars, i),
        _ => false,
    }
}

fn is_decimal_point(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
}
