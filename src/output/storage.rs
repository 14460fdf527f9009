use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::scoring::GcsReport;

/// What gets written by `--output`: the report plus where and when it came from.
#[derive(Debug, Serialize)]
pub struct ReportFile<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: PathBuf,
    #[serde(flatten)]
    pub report: &'a GcsReport,
}

impl<'a> ReportFile<'a> {
    pub fn new(source: &Path, report: &'a GcsReport) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.to_path_buf(),
            report,
        }
    }
}

/// Save a report to a JSON file atomically
///
/// Uses atomic-write-file so a reader never sees a half-written report.
/// Creates the parent directory if it doesn't exist.
pub fn save_report(path: &Path, report: &ReportFile) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, report).context("Failed to serialize report")?;

    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::PredictionRecord;
    use crate::scoring::{evaluate_records, ScoringConfig};

    fn sample_report() -> GcsReport {
        let records = vec![PredictionRecord {
            question_id: "5_obj2_rel1_1neg".to_string(),
            object_id: "5_obj2".to_string(),
            image: "5.jpg".to_string(),
            text: "statement".to_string(),
            label: "no".to_string(),
            model_name: "qwen".to_string(),
            prediction: "False".to_string(),
        }];
        evaluate_records(&records, &ScoringConfig::default()).unwrap()
    }

    #[test]
    fn test_save_report_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("qwen.json");
        let report = sample_report();

        save_report(&path, &ReportFile::new(Path::new("preds/qwen.json"), &report)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["model_name"], "qwen");
        assert_eq!(value["relations_gcs"], 100.0);
        assert!(value["objects_gcs"].is_null());
        assert_eq!(value["source"], "preds/qwen.json");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_save_report_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "stale").unwrap();
        let report = sample_report();

        save_report(&path, &ReportFile::new(Path::new("p.json"), &report)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('{'));
    }
}
