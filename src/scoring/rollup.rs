use serde::Serialize;
use std::collections::BTreeMap;

use super::config::PenaltyMode;
use super::decay::score_sequence;
use super::sequence::{CorrectnessSequence, SequenceKey};
use crate::records::Bucket;

/// Score of one probe sequence, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceScore {
    pub key: SequenceKey,
    pub total_questions: usize,
    pub num_incorrect: usize,
    pub score: f64,
}

impl SequenceScore {
    pub fn from_sequence(sequence: &CorrectnessSequence, mode: PenaltyMode) -> Self {
        Self {
            key: sequence.key.clone(),
            total_questions: sequence.len(),
            num_incorrect: sequence.num_incorrect(),
            score: score_sequence(&sequence.correct, mode),
        }
    }

    pub fn bucket(&self) -> Bucket {
        self.key.category.bucket()
    }
}

/// Number of sequences that fed each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub objects: usize,
    pub attributes: usize,
    pub relations: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Objects => self.objects,
            Bucket::Attributes => self.attributes,
            Bucket::Relations => self.relations,
        }
    }
}

/// Bucket and overall scores as percentages in `[0, 100]`.
///
/// A bucket with no sequences is `None`, never 0 or 100. Values keep full
/// precision; rounding is a display concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
    pub objects_gcs: Option<f64>,
    pub attributes_gcs: Option<f64>,
    pub relations_gcs: Option<f64>,
    /// Mean of the present bucket scores, so buckets weigh equally no matter
    /// how many questions each holds
    pub overall_gcs: Option<f64>,
    pub counts: BucketCounts,
}

impl Rollup {
    pub fn bucket(&self, bucket: Bucket) -> Option<f64> {
        match bucket {
            Bucket::Objects => self.objects_gcs,
            Bucket::Attributes => self.attributes_gcs,
            Bucket::Relations => self.relations_gcs,
        }
    }

    pub fn empty_buckets(&self) -> Vec<Bucket> {
        Bucket::ALL
            .into_iter()
            .filter(|b| self.bucket(*b).is_none())
            .collect()
    }
}

pub fn rollup(scores: &[SequenceScore]) -> Rollup {
    let bucket_scores = |bucket: Bucket| -> Vec<f64> {
        scores
            .iter()
            .filter(|s| s.bucket() == bucket)
            .map(|s| s.score)
            .collect()
    };
    let objects = bucket_scores(Bucket::Objects);
    let attributes = bucket_scores(Bucket::Attributes);
    let relations = bucket_scores(Bucket::Relations);

    let objects_gcs = mean(&objects).map(to_percent);
    let attributes_gcs = mean(&attributes).map(to_percent);
    let relations_gcs = mean(&relations).map(to_percent);

    let present: Vec<f64> = [objects_gcs, attributes_gcs, relations_gcs]
        .into_iter()
        .flatten()
        .collect();

    Rollup {
        objects_gcs,
        attributes_gcs,
        relations_gcs,
        overall_gcs: mean(&present),
        counts: BucketCounts {
            objects: objects.len(),
            attributes: attributes.len(),
            relations: relations.len(),
        },
    }
}

/// Every question of an object, all categories pooled into one sequence,
/// averaged over objects. Reported next to the bucket scores, never mixed in.
pub fn combined_gcs(sequences: &[CorrectnessSequence], mode: PenaltyMode) -> Option<f64> {
    // Sequences arrive in key order, so each object's flags concatenate as
    // object, then attributes, then relations
    let mut per_object: BTreeMap<(&str, &str), Vec<bool>> = BTreeMap::new();
    for sequence in sequences {
        per_object
            .entry((sequence.key.image_id.as_str(), sequence.key.object_id.as_str()))
            .or_default()
            .extend(&sequence.correct);
    }

    let scores: Vec<f64> = per_object
        .values()
        .map(|correct| score_sequence(correct, mode))
        .collect();
    mean(&scores).map(to_percent)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}
