// WHY: analysis-only copy of the text where every narration keyword opens a new segment
// The stored text keeps its diacritics; only this marked copy loses them

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

use super::normalization::collapse_whitespace;

/// Segment marker injected before chain keywords; never part of Arabic script
pub const MARKER: char = '~';

/// Narration keywords that introduce the next link of a chain
pub const CHAIN_KEYWORDS: &[&str] = &[
    "حدثنا", "حدثني", "حدثناه", "حدثه", "ثنا",
    "أخبرنا", "أخبرناه", "أخبرني", "أخبره",
    "سمعت", "سمعنا", "سمعناه", "سمع",
    "عن", "عنه", "عنها",
    "يبلغ به",
    "أنه", "أن", "أنها",
    "قال", "قالت",
];

/// Conjunction that may be attached directly in front of a keyword
pub const CONJUNCTION: &str = "و";

/// Check whether a character is an Arabic diacritic or Quranic annotation mark
pub fn is_arabic_diacritic(ch: char) -> bool {
    matches!(
        ch,
        '\u{0610}'..='\u{061A}' | // Honorific signs and small high marks
        '\u{064B}'..='\u{065F}' | // Tanween, short vowels, shadda, sukun
        '\u{0670}' |              // Superscript alef
        '\u{06D6}'..='\u{06ED}'   // Quranic annotation signs
    )
}

/// Strip diacritics and any stray marker characters
pub fn strip_diacritics(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_arabic_diacritic(c) && c != MARKER)
        .collect()
}

/// Inserts segment markers before chain keywords
pub struct ChainMarker {
    keyword_pattern: Regex,
}

impl ChainMarker {
    /// Compile the keyword pattern: whole words, optional attached conjunction
    pub fn new() -> Result<Self> {
        let pattern = format!(
            r"\b{CONJUNCTION}?(?:{})\b",
            CHAIN_KEYWORDS.join("|")
        );
        let keyword_pattern = Regex::new(&pattern)?;

        debug!("Compiled chain keyword pattern with {} keywords", CHAIN_KEYWORDS.len());

        Ok(Self { keyword_pattern })
    }

    /// Produce the marked analysis copy of normalized text
    pub fn mark(&self, normalized: &str) -> String {
        let plain = strip_diacritics(normalized);
        let mut marked = String::with_capacity(plain.len() + plain.len() / 4);
        let mut last = 0;

        for found in self.keyword_pattern.find_iter(&plain) {
            marked.push_str(&plain[last..found.start()]);
            marked.push(MARKER);
            marked.push(' ');
            marked.push_str(&plain[found.range()]);
            last = found.end();
        }
        marked.push_str(&plain[last..]);

        collapse_whitespace(&marked)
    }
}
