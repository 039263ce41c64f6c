// WHY: standalone normalization logic shared by the segmenter and the record pipeline
// Produces the text that is stored back and that the chain/body split is measured against

/// Punctuation and Arabic marks removed from stored text
/// Arabic comma, Arabic full stop and tatweel sit alongside the ASCII set
pub const STRIPPED_PUNCTUATION: &[char] = &[
    ':', '"', '\'', '\u{060C}', '\u{06D4}', '\u{0640}', '-', '.', ',',
];

/// Honorific closing phrases, longest alternative first
pub const HONORIFIC_PHRASES: &[&str] = &[
    "رضى الله عنهما",
    "رضى الله عنها",
    "رضى الله عنهم",
    "رضى الله عنه",
];

/// Benediction removed as a plain substring
pub const BENEDICTION: &str = "صلى الله عليه وسلم";

/// Normalize raw Arabic narration text
///
/// Removes punctuation, honorific phrases and the benediction, then collapses
/// whitespace. Phrase removal runs to a fixpoint so the result is stable under
/// repeated normalization.
pub fn normalize_arabic(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let stripped: String = raw
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    let mut current = collapse_whitespace(&stripped);
    loop {
        let mut next = current.clone();
        for phrase in HONORIFIC_PHRASES {
            next = next.replace(phrase, "");
        }
        next = next.replace(BENEDICTION, "");
        let next = collapse_whitespace(&next);

        // Every removal shortens the text, so this terminates
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalize the English translation field
///
/// A leading quote drops one quote pair from the ends; any run of two or more
/// quotes becomes a single quote.
pub fn normalize_english(raw: &str) -> String {
    let mut text = raw;
    if let Some(rest) = text.strip_prefix('"') {
        text = rest.strip_suffix('"').unwrap_or(rest);
    }

    let mut result = String::with_capacity(text.len());
    let mut prev_was_quote = false;
    for ch in text.chars() {
        if ch == '"' {
            if !prev_was_quote {
                result.push(ch);
            }
            prev_was_quote = true;
        } else {
            result.push(ch);
            prev_was_quote = false;
        }
    }
    result
}

/// Collapse every whitespace run into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Collapse whitespace into supplied buffer to avoid allocation
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    for word in text.split_whitespace() {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(word);
    }
}
