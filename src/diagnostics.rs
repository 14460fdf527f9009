//! Recoverable conditions collected during a scoring pass.
//!
//! None of these abort scoring; they travel with the report so callers can
//! decide whether partial data is acceptable.

use serde::Serialize;
use std::fmt;

use crate::records::Bucket;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Question id does not follow the key grammar; the record was skipped.
    MalformedRecord { question_id: String, reason: String },
    /// Another record already claimed this order slot; the first one was kept.
    DuplicateOrder { question_id: String, kept: String },
    /// Prediction text matched no known token; scored as incorrect.
    UnmappablePrediction { question_id: String, prediction: String },
    /// Label is unmappable or disagrees with the question polarity.
    LabelPolarityMismatch { question_id: String, label: String },
    /// Order indices of a sequence are not contiguous from 1. Only the first
    /// few missing indices are listed; `missing_count` has the total.
    OrderGap {
        sequence: String,
        missing_count: u32,
        missing_sample: Vec<u32>,
    },
    /// No sequence fell into this bucket; its score is absent.
    EmptyBucket { bucket: Bucket },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecord { question_id, reason } => {
                write!(f, "malformed question id '{}': {}", question_id, reason)
            }
            Diagnostic::DuplicateOrder { question_id, kept } => {
                write!(f, "duplicate order slot '{}' (kept '{}')", question_id, kept)
            }
            Diagnostic::UnmappablePrediction {
                question_id,
                prediction,
            } => write!(
                f,
                "unmappable prediction {:?} for '{}', counted as incorrect",
                prediction, question_id
            ),
            Diagnostic::LabelPolarityMismatch { question_id, label } => write!(
                f,
                "label {:?} for '{}' does not agree with its polarity",
                label, question_id
            ),
            Diagnostic::OrderGap {
                sequence,
                missing_count,
                missing_sample,
            } => {
                let sample: Vec<String> = missing_sample.iter().map(|m| m.to_string()).collect();
                if *missing_count as usize == missing_sample.len() {
                    write!(f, "sequence {} is missing order {}", sequence, sample.join(", "))
                } else {
                    write!(
                        f,
                        "sequence {} is missing {} orders, starting with {}, ...",
                        sequence,
                        missing_count,
                        sample.join(", ")
                    )
                }
            }
            Diagnostic::EmptyBucket { bucket } => {
                write!(f, "no {} questions present, score absent", bucket.name().to_lowercase())
            }
        }
    }
}

/// Per-kind tallies, used for the one-line summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounts {
    pub malformed: usize,
    pub duplicate_order: usize,
    pub unmappable_prediction: usize,
    pub label_mismatch: usize,
    pub order_gap: usize,
    pub empty_bucket: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn counts(&self) -> DiagnosticCounts {
        let mut counts = DiagnosticCounts::default();
        for entry in &self.entries {
            match entry {
                Diagnostic::MalformedRecord { .. } => counts.malformed += 1,
                Diagnostic::DuplicateOrder { .. } => counts.duplicate_order += 1,
                Diagnostic::UnmappablePrediction { .. } => counts.unmappable_prediction += 1,
                Diagnostic::LabelPolarityMismatch { .. } => counts.label_mismatch += 1,
                Diagnostic::OrderGap { .. } => counts.order_gap += 1,
                Diagnostic::EmptyBucket { .. } => counts.empty_bucket += 1,
            }
        }
        counts
    }
}
