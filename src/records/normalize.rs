use tracing::debug;

use super::types::{NormalizedItem, PredictionRecord, QuestionId, Verdict};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ScoringError;
use crate::scoring::{PredictionMatching, ScoringConfig};

pub const DEFAULT_TRUTHY: &[&str] = &["true", "yes", "1"];
pub const DEFAULT_FALSY: &[&str] = &["false", "no", "0"];

/// Maps free-form answer text to a [`Verdict`].
#[derive(Debug, Clone)]
pub struct AnswerMatcher {
    truthy: Vec<String>,
    falsy: Vec<String>,
    matching: PredictionMatching,
}

impl Default for AnswerMatcher {
    /// Default tokens, exact matching. Used for ground-truth labels.
    fn default() -> Self {
        Self {
            truthy: DEFAULT_TRUTHY.iter().map(|t| t.to_string()).collect(),
            falsy: DEFAULT_FALSY.iter().map(|t| t.to_string()).collect(),
            matching: PredictionMatching::Exact,
        }
    }
}

impl AnswerMatcher {
    pub fn from_config(config: &ScoringConfig) -> Self {
        let mut matcher = Self {
            matching: config.prediction_matching,
            ..Self::default()
        };
        matcher
            .truthy
            .extend(config.truthy.iter().map(|t| t.trim().to_lowercase()));
        matcher
            .falsy
            .extend(config.falsy.iter().map(|t| t.trim().to_lowercase()));
        matcher
    }

    pub fn verdict(&self, text: &str) -> Verdict {
        let text = text.trim().to_lowercase();
        if let Some(verdict) = self.exact(&text) {
            return verdict;
        }
        match self.matching {
            PredictionMatching::Exact => Verdict::Unknown,
            PredictionMatching::Lenient => self.lenient(&text),
        }
    }

    fn exact(&self, text: &str) -> Option<Verdict> {
        if self.truthy.iter().any(|t| t == text) {
            Some(Verdict::True)
        } else if self.falsy.iter().any(|t| t == text) {
            Some(Verdict::False)
        } else {
            None
        }
    }

    /// Fallbacks for chatty answers such as "True." or "Yes, the cup is red".
    ///
    /// The last step searches for tokens as whole words, longest token first
    /// whichever side it is on, so "incorrect" beats "correct". Numeric tokens
    /// are skipped there, otherwise any digit in the answer would decide the
    /// verdict.
    fn lenient(&self, text: &str) -> Verdict {
        let stripped = text.trim_end_matches('.').trim_end();
        if let Some(verdict) = self.exact(stripped) {
            return verdict;
        }

        let first_word = stripped.split_whitespace().next().unwrap_or("");
        if let Some(verdict) = self.exact(first_word) {
            return verdict;
        }

        let mut candidates: Vec<(&str, Verdict)> = self
            .truthy
            .iter()
            .map(|t| (t.as_str(), Verdict::True))
            .chain(self.falsy.iter().map(|t| (t.as_str(), Verdict::False)))
            .filter(|(t, _)| t.chars().any(char::is_alphabetic))
            .collect();
        // Stable sort: on equal length truthy still comes first
        candidates.sort_by_key(|(t, _)| std::cmp::Reverse(t.len()));

        candidates
            .into_iter()
            .find(|(t, _)| contains_word(stripped, t))
            .map(|(_, verdict)| verdict)
            .unwrap_or(Verdict::Unknown)
    }
}

/// True if `token` occurs in `text` with no letter or digit directly on
/// either side.
fn contains_word(text: &str, token: &str) -> bool {
    text.match_indices(token).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + token.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Output of [`normalize_records`]: the valid items and everything that was
/// wrong with the rest.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub items: Vec<NormalizedItem>,
    pub diagnostics: Diagnostics,
}

/// Parse and validate every record.
///
/// Malformed question ids are reported and skipped, unless `strict` is set,
/// in which case the first one aborts with [`ScoringError::MalformedRecord`].
pub fn normalize_records(
    records: &[PredictionRecord],
    matcher: &AnswerMatcher,
    strict: bool,
) -> Result<Normalized, ScoringError> {
    let label_matcher = AnswerMatcher::default();
    let mut normalized = Normalized::default();

    for record in records {
        let question = match QuestionId::parse(&record.question_id) {
            Ok(q) => q,
            Err(source) if strict => {
                return Err(ScoringError::MalformedRecord {
                    question_id: record.question_id.clone(),
                    source,
                });
            }
            Err(e) => {
                debug!(question_id = %record.question_id, error = %e, "skipping malformed record");
                normalized.diagnostics.push(Diagnostic::MalformedRecord {
                    question_id: record.question_id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // Label wins over polarity; polarity only fills in for unusable labels
        let from_polarity = question.polarity.expected();
        let expected = match label_matcher.verdict(&record.label).as_bool() {
            Some(label) => {
                if label != from_polarity {
                    normalized.diagnostics.push(Diagnostic::LabelPolarityMismatch {
                        question_id: record.question_id.clone(),
                        label: record.label.clone(),
                    });
                }
                label
            }
            None => {
                normalized.diagnostics.push(Diagnostic::LabelPolarityMismatch {
                    question_id: record.question_id.clone(),
                    label: record.label.clone(),
                });
                from_polarity
            }
        };

        let predicted = matcher.verdict(&record.prediction);
        if predicted == Verdict::Unknown {
            normalized.diagnostics.push(Diagnostic::UnmappablePrediction {
                question_id: record.question_id.clone(),
                prediction: record.prediction.clone(),
            });
        }

        normalized.items.push(NormalizedItem {
            question_id: record.question_id.clone(),
            image_id: question.image_id,
            object_id: question.object_id,
            category: question.category,
            order_index: question.order_index,
            polarity: question.polarity,
            expected,
            predicted,
        });
    }

    Ok(normalized)
}
