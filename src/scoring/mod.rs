pub mod config;
pub mod decay;
pub mod engine;
pub mod rollup;
pub mod sequence;
pub mod validation;

pub use config::*;
pub use decay::{consistency_from_counts, partial_geometric_sum, score_sequence};
pub use engine::{compare_overall, evaluate_records, GcsReport};
pub use rollup::{combined_gcs, rollup, BucketCounts, Rollup, SequenceScore};
pub use sequence::{build_sequences, CorrectnessSequence, SequenceKey};
pub use validation::validate_scoring;
