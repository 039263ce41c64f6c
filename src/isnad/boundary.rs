// WHY: ordered heuristics that decide where narrator chain language ends
// Policy lives in a decision table so each rule can be tested without the scan loop

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::markers::MARKER;

/// Configuration for chain/body boundary heuristics
#[derive(Debug, Clone)]
pub struct BoundaryRules {
    /// Terms whose presence means the reported subject has been introduced
    pub subject_terms: Vec<String>,
    /// Patronymic words that keep a segment inside the chain
    pub patronymic_terms: Vec<String>,
    /// A narrator-free segment must have more words than this to count as body
    pub min_body_words: usize,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self {
            subject_terms: vec!["نبي".to_string(), "رسول".to_string()],
            patronymic_terms: vec!["بن".to_string(), "ابن".to_string()],
            min_body_words: 7,
        }
    }
}

/// One marker-delimited slice of marked text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub index: usize,
    pub text: &'a str,
    pub word_count: usize,
}

impl<'a> Segment<'a> {
    pub fn new(index: usize, text: &'a str) -> Self {
        Self {
            index,
            text,
            word_count: text.split_whitespace().count(),
        }
    }
}

/// Per-segment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentVerdict {
    /// Mentions the Prophet or the Messenger
    ExplicitSubject,
    /// Long enough and free of patronymics
    NarratorFreeSegment,
    /// Still narrator chain
    Chain,
}

/// Which rule fixed the start of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    ExplicitSubject,
    NarratorFreeSegment,
    LastSegmentFallback,
    NoSegments,
}

/// Body estimate in marked-text word space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyEstimate {
    /// Body segments rejoined with single spaces, markers removed
    pub body_marked: String,
    /// First segment of the body, if any segment existed
    pub segment_index: Option<usize>,
    pub rule: BoundaryRule,
}

type Predicate = fn(&Segment<'_>, &BoundaryRules) -> bool;

/// Ordered heuristics; the first predicate that holds decides the verdict
const DECISION_TABLE: [(SegmentVerdict, Predicate); 2] = [
    (SegmentVerdict::ExplicitSubject, mentions_subject),
    (SegmentVerdict::NarratorFreeSegment, is_narrator_free),
];

fn mentions_subject(segment: &Segment<'_>, rules: &BoundaryRules) -> bool {
    rules
        .subject_terms
        .iter()
        .any(|term| segment.text.contains(term.as_str()))
}

fn is_narrator_free(segment: &Segment<'_>, rules: &BoundaryRules) -> bool {
    segment.word_count > rules.min_body_words && !has_interior_patronymic(segment.text, rules)
}

/// Patronymic as a standalone word with words on both sides
fn has_interior_patronymic(text: &str, rules: &BoundaryRules) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return false;
    }
    words[1..words.len() - 1]
        .iter()
        .any(|word| rules.patronymic_terms.iter().any(|term| term == word))
}

/// Classify a single segment against the decision table
pub fn classify(segment: &Segment<'_>, rules: &BoundaryRules) -> SegmentVerdict {
    DECISION_TABLE
        .iter()
        .find(|(_, predicate)| predicate(segment, rules))
        .map(|(verdict, _)| *verdict)
        .unwrap_or(SegmentVerdict::Chain)
}

/// Split marked text into trimmed, non-empty segments in narration order
pub fn split_segments(marked: &str) -> Vec<Segment<'_>> {
    marked
        .split(MARKER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(index, text)| Segment::new(index, text))
        .collect()
}

fn join_from(segments: &[Segment<'_>], start: usize) -> String {
    segments[start..]
        .iter()
        .map(|s| s.text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locate the body region of marked text
pub fn find_body(marked: &str, rules: &BoundaryRules) -> BodyEstimate {
    let segments = split_segments(marked);
    let Some(last) = segments.last() else {
        return BodyEstimate {
            body_marked: String::new(),
            segment_index: None,
            rule: BoundaryRule::NoSegments,
        };
    };

    for segment in &segments {
        let rule = match classify(segment, rules) {
            SegmentVerdict::ExplicitSubject => BoundaryRule::ExplicitSubject,
            SegmentVerdict::NarratorFreeSegment => BoundaryRule::NarratorFreeSegment,
            SegmentVerdict::Chain => continue,
        };
        debug!(
            "Body starts at segment {} of {} ({:?})",
            segment.index,
            segments.len(),
            rule
        );
        return BodyEstimate {
            body_marked: join_from(&segments, segment.index),
            segment_index: Some(segment.index),
            rule,
        };
    }

    // Under-split rather than guess: only the last clause is body
    BodyEstimate {
        body_marked: last.text.to_string(),
        segment_index: Some(last.index),
        rule: BoundaryRule::LastSegmentFallback,
    }
}
