//! Ghost Consistency Score (GCS) for vision-language model probe batteries.
//!
//! Prediction records flow through four stages:
//! [`records::normalize_records`] parses question ids and maps answers,
//! [`scoring::build_sequences`] groups them into ordered per-object,
//! per-category sequences, [`scoring::score_sequence`] turns each sequence
//! into a decayed-penalty score, and [`scoring::rollup()`] averages those into
//! bucket and overall percentages. [`scoring::evaluate_records`] runs the
//! whole pass.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod records;
pub mod scoring;
