use serde::{Deserialize, Serialize};

/// Main scoring configuration.
///
/// Every field is optional in the YAML file; missing fields take the
/// defaults below.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   penalty: count
///   prediction_matching: lenient
///   truthy: ["correct"]
///   falsy: ["incorrect"]
///   strict: false
///   decimals: 2
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringConfig {
    /// How wrong answers are turned into a penalty (default: count)
    pub penalty: PenaltyMode,

    /// How raw prediction text is mapped to a verdict (default: exact)
    pub prediction_matching: PredictionMatching,

    /// Extra tokens accepted as "true", on top of true/yes/1
    pub truthy: Vec<String>,

    /// Extra tokens accepted as "false", on top of false/no/0
    pub falsy: Vec<String>,

    /// Abort on the first malformed question id instead of skipping it
    pub strict: bool,

    /// Decimal places shown for percentages; computation is unaffected
    pub decimals: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty: PenaltyMode::Count,
            prediction_matching: PredictionMatching::Exact,
            truthy: Vec::new(),
            falsy: Vec::new(),
            strict: false,
            decimals: 2,
        }
    }
}

/// Penalty model for the consistency score.
///
/// `Count` is the metric as published: only the number of wrong answers
/// matters, so `[ok, wrong]` and `[wrong, ok]` score the same even though the
/// metric is described as weighting early errors more. `Position` weights each
/// wrong answer by `(1/2)^position` instead; it agrees with `Count` whenever
/// the wrong answers form a prefix of the sequence.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyMode {
    #[default]
    Count,
    Position,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMatching {
    /// Whole answer must equal a token (after trimming, case-insensitive)
    #[default]
    Exact,
    /// Also try without trailing dots, the first word, then substrings
    Lenient,
}
