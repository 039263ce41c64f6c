// WHY: the marked copy no longer lines up with the stored text character by character,
// so the body estimate is carried back by word count only

/// Word offset into the normalized text where the body begins
///
/// `None` means there is no chain prefix to strip: either side is empty or
/// the body estimate covers at least as many words as the whole text.
pub fn boundary_index(normalized: &str, body_marked: &str) -> Option<usize> {
    let full_words = normalized.split_whitespace().count();
    let body_words = body_marked.split_whitespace().count();

    if full_words == 0 || body_words == 0 || body_words >= full_words {
        return None;
    }
    Some(full_words - body_words)
}

/// Split normalized text into (chain, body) using the body estimate's word count
pub fn split(normalized: &str, body_marked: &str) -> (String, String) {
    let Some(boundary) = boundary_index(normalized, body_marked) else {
        return (String::new(), normalized.trim().to_string());
    };

    let words: Vec<&str> = normalized.split_whitespace().collect();
    (words[..boundary].join(" "), words[boundary..].join(" "))
}
