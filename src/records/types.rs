use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One line of a prediction file, exactly as produced by the prediction runner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PredictionRecord {
    pub question_id: String,
    pub object_id: String,
    pub image: String,
    pub text: String,
    pub label: String,
    pub model_name: String,
    pub prediction: String,
}

/// Probe type of a question: object presence, or a numbered attribute/relation.
///
/// Ordering is Object < Attribute(n) < Relation(n), which is also the order
/// sequences appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Object,
    Attribute(u32),
    Relation(u32),
}

impl Category {
    pub fn bucket(&self) -> Bucket {
        match self {
            Category::Object => Bucket::Objects,
            Category::Attribute(_) => Bucket::Attributes,
            Category::Relation(_) => Bucket::Relations,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Object => write!(f, "object"),
            Category::Attribute(n) => write!(f, "attr{}", n),
            Category::Relation(n) => write!(f, "rel{}", n),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Top-level aggregation group used in the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Objects,
    Attributes,
    Relations,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Objects, Bucket::Attributes, Bucket::Relations];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Objects => "Objects",
            Bucket::Attributes => "Attributes",
            Bucket::Relations => "Relations",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    #[serde(rename = "pos")]
    Positive,
    #[serde(rename = "neg")]
    Negative,
}

impl Polarity {
    /// Ground-truth answer implied by the polarity ("pos" means yes).
    pub fn expected(&self) -> bool {
        matches!(self, Polarity::Positive)
    }
}

/// Mapped model answer. `Unknown` never counts as correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    Unknown,
}

impl Verdict {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Verdict::True => Some(true),
            Verdict::False => Some(false),
            Verdict::Unknown => None,
        }
    }

    pub fn matches(&self, expected: bool) -> bool {
        self.as_bool() == Some(expected)
    }
}

/// Parsed form of `{image_id}_{object_id}_{question_type}_{order}{polarity}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionId {
    pub image_id: String,
    pub object_id: String,
    pub category: Category,
    pub order_index: u32,
    pub polarity: Polarity,
}

/// A validated record, ready for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub question_id: String,
    pub image_id: String,
    pub object_id: String,
    pub category: Category,
    pub order_index: u32,
    pub polarity: Polarity,
    pub expected: bool,
    pub predicted: Verdict,
}

impl NormalizedItem {
    pub fn is_correct(&self) -> bool {
        self.predicted.matches(self.expected)
    }
}
