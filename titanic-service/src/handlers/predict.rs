use crate::dtos::{PredictRequest, PredictResponse};
use crate::models::FeatureVector;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use service_core::error::AppError;

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::BadRequest(anyhow::anyhow!(
            "Invalid JSON body: {}",
            rejection.body_text()
        ))
    })?;

    let values = request.features.unwrap_or_default();
    let features = FeatureVector::from_json(&values).map_err(|e| {
        tracing::debug!(error = %e, "Rejected feature payload");
        AppError::BadRequest(e.into())
    })?;

    let prediction = state.classifier.predict(&features).map_err(|e| {
        tracing::error!(error = %e, "Prediction failed");
        AppError::OperationFailed(e.into())
    })?;

    tracing::info!(label = prediction.label, "API prediction served");
    Ok(Json(prediction.into()))
}
