use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

use super::config::{PenaltyMode, ScoringConfig};
use super::rollup::{combined_gcs, rollup, Rollup, SequenceScore};
use super::sequence::build_sequences;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ScoringError;
use crate::records::{normalize_records, AnswerMatcher, PredictionRecord};

/// Result of one scoring pass over a snapshot of prediction records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcsReport {
    /// Set when every record names the same model
    pub model_name: Option<String>,
    pub penalty: PenaltyMode,
    pub total_records: usize,
    /// Records that made it into a sequence (after skipping malformed ones
    /// and dropping duplicates)
    pub scored_questions: usize,
    #[serde(flatten)]
    pub rollup: Rollup,
    pub combined_gcs: Option<f64>,
    pub breakdown: Vec<SequenceScore>,
    pub diagnostics: Diagnostics,
}

/// Score a set of prediction records.
///
/// Pure and deterministic: the same records and config always give the same
/// report. Recoverable problems end up in `report.diagnostics`; the only
/// error is a malformed question id under `config.strict`.
pub fn evaluate_records(
    records: &[PredictionRecord],
    config: &ScoringConfig,
) -> Result<GcsReport, ScoringError> {
    let matcher = AnswerMatcher::from_config(config);
    let normalized = normalize_records(records, &matcher, config.strict)?;
    let mut diagnostics = normalized.diagnostics;

    let sequences = build_sequences(&normalized.items, &mut diagnostics);
    debug!(
        items = normalized.items.len(),
        sequences = sequences.len(),
        "built correctness sequences"
    );

    let breakdown: Vec<SequenceScore> = sequences
        .iter()
        .map(|s| SequenceScore::from_sequence(s, config.penalty))
        .collect();
    let rollup = rollup(&breakdown);
    for bucket in rollup.empty_buckets() {
        diagnostics.push(Diagnostic::EmptyBucket { bucket });
    }

    let report = GcsReport {
        model_name: common_model_name(records),
        penalty: config.penalty,
        total_records: records.len(),
        scored_questions: breakdown.iter().map(|s| s.total_questions).sum(),
        combined_gcs: combined_gcs(&sequences, config.penalty),
        rollup,
        breakdown,
        diagnostics,
    };

    info!(
        records = report.total_records,
        scored = report.scored_questions,
        diagnostics = report.diagnostics.len(),
        "scoring complete"
    );
    Ok(report)
}

fn common_model_name(records: &[PredictionRecord]) -> Option<String> {
    let first = records.first()?;
    records
        .iter()
        .all(|r| r.model_name == first.model_name)
        .then(|| first.model_name.clone())
}

/// Ranking order for comparing models: higher overall first, absent last.
pub fn compare_overall(a: &GcsReport, b: &GcsReport) -> Ordering {
    match (a.rollup.overall_gcs, b.rollup.overall_gcs) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Bucket;

    fn record(question_id: &str, label: &str, prediction: &str) -> PredictionRecord {
        PredictionRecord {
            question_id: question_id.to_string(),
            object_id: question_id.split('_').take(2).collect::<Vec<_>>().join("_"),
            image: format!("{}.jpg", question_id.split('_').next().unwrap_or("")),
            text: "statement".to_string(),
            label: label.to_string(),
            model_name: "test-model".to_string(),
            prediction: prediction.to_string(),
        }
    }

    #[test]
    fn test_two_objects_objects_bucket_only() {
        // obj1 answers both correctly, obj2 misses one of two
        let records = vec![
            record("1_obj1_1pos", "yes", "true"),
            record("1_obj1_2neg", "no", "false"),
            record("1_obj2_1pos", "yes", "false"),
            record("1_obj2_2neg", "no", "false"),
        ];
        let report = evaluate_records(&records, &ScoringConfig::default()).unwrap();

        let obj2 = 1.0 - 1.0 / 1.5;
        let expected = (1.0 + obj2) / 2.0 * 100.0;
        let objects = report.rollup.objects_gcs.unwrap();
        assert!((objects - expected).abs() < 1e-9);
        assert_eq!(report.rollup.attributes_gcs, None);
        assert_eq!(report.rollup.relations_gcs, None);
        assert_eq!(report.rollup.overall_gcs, Some(objects));
        assert_eq!(report.diagnostics.counts().empty_bucket, 2);
    }

    #[test]
    fn test_end_to_end_all_buckets() {
        let records = vec![
            // obj1 object presence: [ok, ok, ok] -> 1.0
            record("7_obj1_1pos", "yes", "yes"),
            record("7_obj1_2neg", "no", "no"),
            record("7_obj1_3neg", "no", "No"),
            // obj1 attr1: [wrong, ok, ok] -> 1 - 1/1.75
            record("7_obj1_attr1_1pos", "yes", "false"),
            record("7_obj1_attr1_2neg", "no", "false"),
            record("7_obj1_attr1_3neg", "no", "false"),
            // obj1 rel1: [wrong] -> 0.0
            record("7_obj1_rel1_1pos", "yes", "no"),
        ];
        let report = evaluate_records(&records, &ScoringConfig::default()).unwrap();

        assert_eq!(report.total_records, 7);
        assert_eq!(report.scored_questions, 7);
        assert_eq!(report.breakdown.len(), 3);
        assert_eq!(report.model_name.as_deref(), Some("test-model"));

        let attr = (1.0 - 1.0 / 1.75) * 100.0;
        assert_eq!(report.rollup.objects_gcs, Some(100.0));
        assert!((report.rollup.attributes_gcs.unwrap() - attr).abs() < 1e-9);
        assert_eq!(report.rollup.relations_gcs, Some(0.0));

        let overall = (100.0 + attr + 0.0) / 3.0;
        assert!((report.rollup.overall_gcs.unwrap() - overall).abs() < 1e-9);

        // Pooled: 7 questions, 2 wrong
        let s7 = 1.0 + 0.5 + 0.25 + 0.125 + 0.0625 + 0.03125 + 0.015625;
        let combined = (1.0 - 1.5 / s7) * 100.0;
        assert!((report.combined_gcs.unwrap() - combined).abs() < 1e-9);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_error_position_ignored_in_count_mode() {
        let late = vec![
            record("1_obj1_1pos", "yes", "true"),
            record("1_obj1_2pos", "yes", "false"),
        ];
        let early = vec![
            record("1_obj1_1pos", "yes", "false"),
            record("1_obj1_2pos", "yes", "true"),
        ];
        let config = ScoringConfig::default();
        let late = evaluate_records(&late, &config).unwrap();
        let early = evaluate_records(&early, &config).unwrap();
        assert_eq!(late.rollup.objects_gcs, early.rollup.objects_gcs);

        let config = ScoringConfig {
            penalty: PenaltyMode::Position,
            ..ScoringConfig::default()
        };
        let late = evaluate_records(
            &[record("1_obj1_1pos", "yes", "true"), record("1_obj1_2pos", "yes", "false")],
            &config,
        )
        .unwrap();
        let early = evaluate_records(
            &[record("1_obj1_1pos", "yes", "false"), record("1_obj1_2pos", "yes", "true")],
            &config,
        )
        .unwrap();
        assert!(late.rollup.objects_gcs.unwrap() > early.rollup.objects_gcs.unwrap());
    }

    #[test]
    fn test_input_order_irrelevant() {
        let mut records = vec![
            record("1_obj1_1pos", "yes", "false"),
            record("1_obj1_2pos", "yes", "true"),
            record("1_obj1_attr1_1neg", "no", "true"),
            record("2_obj4_rel2_1pos", "yes", "true"),
        ];
        let config = ScoringConfig::default();
        let forward = evaluate_records(&records, &config).unwrap();
        records.reverse();
        let backward = evaluate_records(&records, &config).unwrap();
        assert_eq!(forward.rollup, backward.rollup);
        assert_eq!(forward.breakdown, backward.breakdown);
    }

    #[test]
    fn test_best_effort_with_malformed_and_unmappable() {
        let records = vec![
            record("not-a-key", "yes", "true"),
            record("1_obj1_1pos", "yes", "dunno"),
            record("1_obj1_2neg", "no", "false"),
        ];
        let report = evaluate_records(&records, &ScoringConfig::default()).unwrap();

        assert_eq!(report.total_records, 3);
        assert_eq!(report.scored_questions, 2);
        let counts = report.diagnostics.counts();
        assert_eq!(counts.malformed, 1);
        assert_eq!(counts.unmappable_prediction, 1);
        assert_eq!(report.breakdown[0].num_incorrect, 1);
    }

    #[test]
    fn test_strict_mode_aborts() {
        let records = vec![record("not-a-key", "yes", "true")];
        let config = ScoringConfig {
            strict: true,
            ..ScoringConfig::default()
        };
        assert!(evaluate_records(&records, &config).is_err());
    }

    #[test]
    fn test_empty_records() {
        let report = evaluate_records(&[], &ScoringConfig::default()).unwrap();
        assert_eq!(report.model_name, None);
        assert_eq!(report.rollup.overall_gcs, None);
        assert_eq!(report.combined_gcs, None);
        assert_eq!(report.diagnostics.counts().empty_bucket, 3);
    }

    #[test]
    fn test_mixed_models_have_no_name() {
        let mut other = record("1_obj1_2pos", "yes", "true");
        other.model_name = "other".to_string();
        let records = vec![record("1_obj1_1pos", "yes", "true"), other];
        let report = evaluate_records(&records, &ScoringConfig::default()).unwrap();
        assert_eq!(report.model_name, None);
    }

    #[test]
    fn test_report_json_shape() {
        let records = vec![record("1_obj1_1pos", "yes", "true")];
        let report = evaluate_records(&records, &ScoringConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["objects_gcs"], 100.0);
        assert!(json["attributes_gcs"].is_null());
        assert!(json["relations_gcs"].is_null());
        assert_eq!(json["overall_gcs"], 100.0);
        assert_eq!(json["penalty"], "count");
        assert_eq!(json["breakdown"][0]["key"]["category"], "object");
        assert_eq!(json["diagnostics"][0]["kind"], "empty_bucket");
    }

    #[test]
    fn test_compare_overall_orders_absent_last() {
        let scored = evaluate_records(
            &[record("1_obj1_1pos", "yes", "true")],
            &ScoringConfig::default(),
        )
        .unwrap();
        let weaker = evaluate_records(
            &[record("1_obj1_1pos", "yes", "false")],
            &ScoringConfig::default(),
        )
        .unwrap();
        let empty = evaluate_records(&[], &ScoringConfig::default()).unwrap();

        assert_eq!(compare_overall(&scored, &weaker), Ordering::Less);
        assert_eq!(compare_overall(&weaker, &empty), Ordering::Less);
        assert_eq!(compare_overall(&empty, &scored), Ordering::Greater);
        assert_eq!(compare_overall(&empty, &empty), Ordering::Equal);
        assert!(empty.rollup.empty_buckets().contains(&Bucket::Objects));
    }
}
