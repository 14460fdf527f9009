use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::types::PredictionRecord;
use crate::error::LoadError;

const REQUIRED_FIELDS: [&str; 7] = [
    "question_id",
    "object_id",
    "image",
    "text",
    "label",
    "model_name",
    "prediction",
];

/// Load prediction records from a JSON file
///
/// The file must hold a JSON array whose elements are objects carrying every
/// required field as a string. Extra fields are ignored. An empty array is
/// valid input.
pub fn load_predictions(path: &Path) -> Result<Vec<PredictionRecord>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_predictions(&content, path)?;
    debug!(path = %path.display(), records = records.len(), "loaded predictions");
    Ok(records)
}

/// Parse prediction records from JSON text. `path` is only used in errors.
pub fn parse_predictions(content: &str, path: &Path) -> Result<Vec<PredictionRecord>, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(elements) = value else {
        return Err(LoadError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            check_record_shape(&element).map_err(|reason| LoadError::InvalidRecord {
                path: path.to_path_buf(),
                index,
                reason,
            })?;
            serde_json::from_value(element).map_err(|e| LoadError::InvalidRecord {
                path: path.to_path_buf(),
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn check_record_shape(element: &Value) -> Result<(), String> {
    let Some(object) = element.as_object() else {
        return Err("not a JSON object".to_string());
    };
    for field in REQUIRED_FIELDS {
        match object.get(field) {
            None => return Err(format!("missing field '{}'", field)),
            Some(Value::String(_)) => {}
            Some(_) => return Err(format!("field '{}' is not a string", field)),
        }
    }
    Ok(())
}
