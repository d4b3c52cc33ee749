//! Wire contract with the ML platform
//!
//! Paths are relative to the configured base endpoint and are used exactly
//! as the platform defines them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `status` value reported by a successful cleaning request
pub const CLEANED_STATUS: &str = "cleaned";

pub mod paths {
    use super::ModelType;

    pub const ROOT: &str = "api/";
    pub const MODELS_LIST: &str = "api/models/list";
    pub const DATASET_UPLOAD: &str = "api/dataset/upload";
    pub const DATASET_CLEAN: &str = "api/dataset/clean";
    pub const MODEL_TRAIN: &str = "api/model/train";

    /// Hyperparameter schema for one model
    pub fn model_parameters(
        model_type: ModelType,
        model_name: &str,
        model_category: Option<&str>,
    ) -> String {
        let path = format!("api/models/parameters/{}/{}", model_type, model_name);
        match model_category {
            Some(category) => format!("{}?model_category={}", path, category),
            None => path,
        }
    }

    pub fn dataset_columns(dataset_id: &str) -> String {
        format!("api/dataset/{}/columns", dataset_id)
    }

    pub fn model_progress(job_id: &str) -> String {
        format!("api/model/progress/{}", job_id)
    }

    pub fn model_download(job_id: &str) -> String {
        format!("api/model/download/{}", job_id)
    }
}

/// Model family, as named in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Supervised,
    Unsupervised,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Supervised => "supervised",
            ModelType::Unsupervised => "unsupervised",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST api/dataset/clean`
#[derive(Debug, Serialize)]
pub struct CleanRequest<'a> {
    pub dataset_id: &'a str,
    pub target_column: &'a str,
}

/// Body of `POST api/model/train`
#[derive(Debug, Serialize)]
pub struct TrainRequest<'a> {
    pub dataset_id: &'a str,
    pub model_type: ModelType,
    pub model_category: &'a str,
    pub model_name: &'a str,
    pub parameters: Value,
    pub target_column: &'a str,
}

/// Fields read from `GET api/model/progress/{job_id}`
///
/// Decoding is lenient: a missing or oddly typed field reads as absent
/// rather than failing the check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobProgress {
    pub status: Option<String>,
    /// Percent complete; 0 when the platform omits it
    pub progress: f64,
    pub message: Option<String>,
}

impl JobProgress {
    pub fn from_payload(payload: &Value) -> Self {
        let progress = match payload.get("progress") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };

        Self {
            status: payload
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
            progress,
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Read an identifier field (`dataset_id`, `job_id`) from a payload
///
/// Numbers are accepted and rendered as text; empty strings are not ids.
pub fn identifier(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
