pub mod loader;
pub mod normalize;
pub mod question_id;
pub mod types;

pub use loader::{load_predictions, parse_predictions};
pub use normalize::{normalize_records, AnswerMatcher, Normalized};
pub use question_id::QuestionIdError;
pub use types::{
    Bucket, Category, NormalizedItem, Polarity, PredictionRecord, QuestionId, Verdict,
};
