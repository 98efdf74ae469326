use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use service_core::{error::AppError, utils::secret::secrets_match};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Gate a route on the configured API key. Runs before the body is read, so
/// an unauthenticated caller gets 401 whatever it sent.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let authorized =
        provided.is_some_and(|key| secrets_match(state.api_key.expose_secret(), key));

    if !authorized {
        tracing::warn!(
            path = %req.uri().path(),
            key_present = provided.is_some(),
            "Rejected request to protected route"
        );
        return Err(unauthorized());
    }

    Ok(next.run(req).await)
}

fn unauthorized() -> AppError {
    AppError::Unauthorized(anyhow::anyhow!("Unauthorized"))
}
