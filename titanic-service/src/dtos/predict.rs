use crate::models::{Label, Prediction};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /predict`. Elements are kept as raw JSON so that a
/// non-numeric entry can be reported by position.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: Label,
    pub survived: String,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction: prediction.label,
            survived: if prediction.survived() { "Yes" } else { "No" }.to_string(),
        }
    }
}
