use axum::{http::Uri, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub const READY_MESSAGE: &str =
    "Titanic Prediction API Ready! POST to /predict or use /form to try it visually.";

pub async fn index() -> &'static str {
    READY_MESSAGE
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "titanic-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
