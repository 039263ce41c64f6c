// WHY: single entry point for chain/body segmentation of one narration text
// Pipeline: normalize -> mark -> find body segment -> realign onto normalized words

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod boundary;
pub mod markers;
pub mod normalization;
pub mod realign;

pub use boundary::{BodyEstimate, BoundaryRule, BoundaryRules, Segment, SegmentVerdict};
pub use markers::ChainMarker;
pub use normalization::{normalize_arabic, normalize_english};

/// Chain/body split of one narration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Narrator chain; empty when none was detected
    pub chain: String,
    /// Reported statement
    pub body: String,
    /// Heuristic that placed the boundary
    pub rule: BoundaryRule,
}

impl Segmentation {
    pub fn has_chain(&self) -> bool {
        !self.chain.is_empty()
    }

    /// Chain and body joined back into the normalized text
    pub fn rejoined(&self) -> String {
        match (self.chain.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => self.chain.clone(),
            (false, false) => format!("{} {}", self.chain, self.body),
        }
    }
}

/// Chain/body segmenter with compiled keyword patterns
pub struct ChainSegmenter {
    marker: ChainMarker,
    rules: BoundaryRules,
}

impl ChainSegmenter {
    /// Create segmenter with custom heuristic rules
    pub fn new(rules: BoundaryRules) -> Result<Self> {
        Ok(Self {
            marker: ChainMarker::new()?,
            rules,
        })
    }

    /// Create segmenter with default rules
    pub fn with_default_rules() -> Result<Self> {
        Self::new(BoundaryRules::default())
    }

    pub fn rules(&self) -> &BoundaryRules {
        &self.rules
    }

    /// Normalize raw record text and split it into chain and body
    pub fn segment(&self, raw: &str) -> Segmentation {
        let normalized = normalize_arabic(raw);
        self.segment_normalized(&normalized)
    }

    /// Split text that has already been through `normalize_arabic`
    pub fn segment_normalized(&self, normalized: &str) -> Segmentation {
        let estimate = self.estimate_body(normalized);
        let (chain, body) = realign::split(normalized, &estimate.body_marked);

        Segmentation {
            chain,
            body,
            rule: estimate.rule,
        }
    }

    /// Body estimate in marked-word space, before realignment
    pub fn estimate_body(&self, normalized: &str) -> BodyEstimate {
        let marked = self.marker.mark(normalized);
        boundary::find_body(&marked, &self.rules)
    }
}
