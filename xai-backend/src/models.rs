use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use xai_ingest::domain::ROW_ID_KEY;
use xai_ingest::{Dataset, Row};

use crate::error::BackendError;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadDataResponse {
    pub columns: Vec<String>,
    #[serde(default)]
    pub sample_data: Vec<Record>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Classification,
    Regression,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainRequest {
    pub model_type: String,
    pub target_column: String,
    pub feature_columns: Vec<String>,
    pub problem_type: ProblemType,
}

impl TrainRequest {
    /// Last column is the target, every other column a feature.
    pub fn with_default_split(
        dataset: &Dataset,
        model_type: impl Into<String>,
        problem_type: ProblemType,
    ) -> Result<Self, BackendError> {
        let Some((target, features)) = dataset.headers.split_last() else {
            return Err(BackendError::InvalidRequest {
                message: format!("{} has no columns", dataset.file_name),
            });
        };
        if features.is_empty() {
            return Err(BackendError::InvalidRequest {
                message: format!("{} has no feature columns besides the target", dataset.file_name),
            });
        }

        Ok(Self {
            model_type: model_type.into(),
            target_column: target.clone(),
            feature_columns: features.to_vec(),
            problem_type,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainResponse {
    pub model_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub problem_type: Option<ProblemType>,
    #[serde(default)]
    pub target_column: Option<String>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub sample_data_with_predictions: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainRequest {
    pub model_id: String,
    pub data_point: Record,
}

impl ExplainRequest {
    /// Uses the row's header-keyed values; the synthetic row number is not a
    /// model feature and is left out.
    pub fn for_row(model_id: impl Into<String>, dataset: &Dataset, row: &Row) -> Self {
        let mut data_point = dataset.record(row);
        data_point.remove(ROW_ID_KEY);
        Self {
            model_id: model_id.into(),
            data_point,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapExplanation {
    pub base_value: f64,
    pub features: Vec<String>,
    pub shap_values: Vec<f64>,
    #[serde(default)]
    pub explainer_type: Option<String>,
    #[serde(default)]
    pub reliability_score: Option<f64>,
}

impl ShapExplanation {
    /// Feature contributions ordered by absolute magnitude, largest first.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .features
            .iter()
            .map(String::as_str)
            .zip(self.shap_values.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked
    }

    /// Base value plus every contribution.
    pub fn output(&self) -> f64 {
        self.base_value + self.shap_values.iter().sum::<f64>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimeExplanation {
    pub lime_explanation: HashMap<String, f64>,
    #[serde(default)]
    pub reliability_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainResponse {
    pub shap: ShapExplanation,
    pub lime: LimeExplanation,
    #[serde(default)]
    pub overall_reliability: Option<f64>,
    #[serde(default)]
    pub explanation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationType {
    Shap,
    Lime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRequest {
    pub model_id: String,
    pub explanation_id: String,
    pub rating: u8,
    pub comment: String,
    pub explanation_type: ExplanationType,
}

impl FeedbackRequest {
    /// `rating` is on a 1–5 scale. Without an explanation id from the backend a
    /// fresh one is generated.
    pub fn new(
        model_id: impl Into<String>,
        explanation_id: Option<String>,
        explanation_type: ExplanationType,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Self, BackendError> {
        if !(1..=5).contains(&rating) {
            return Err(BackendError::InvalidRequest {
                message: format!("Rating must be between 1 and 5, got {}", rating),
            });
        }

        Ok(Self {
            model_id: model_id.into(),
            explanation_id: explanation_id
                .unwrap_or_else(|| format!("exp_{}", Uuid::new_v4().simple())),
            rating,
            comment: comment.into(),
            explanation_type,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
