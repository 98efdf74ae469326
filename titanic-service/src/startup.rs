use crate::config::Settings;
use crate::handlers::{form_page, form_submit, health_check, index, not_found, predict};
use crate::middleware::api_key_middleware;
use crate::services::{Classifier, ModelArtifact};
use axum::{
    body::Body,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use secrecy::Secret;
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared, read-only request state. The classifier is loaded once and
/// never mutated, so handlers use it without locking.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub api_key: Secret<String>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, api_key: Secret<String>) -> Self {
        Self {
            classifier,
            api_key,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/form", get(form_page).post(form_submit))
        .route(
            "/predict",
            post(predict).layer(from_fn_with_state(state.clone(), api_key_middleware)),
        )
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| make_request_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Load the model and bind the listener. A missing or malformed model
    /// aborts startup.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        settings.validate()?;

        let artifact = ModelArtifact::load(&settings.model.path).map_err(|e| {
            tracing::error!("Failed to load model: {}", e);
            AppError::ConfigError(e.into())
        })?;
        tracing::info!(
            path = %settings.model.path.display(),
            kind = artifact.kind(),
            "Model loaded"
        );

        let state = AppState::new(Arc::new(artifact), settings.auth.api_key.clone());
        let app = build_router(state);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}:{}", settings.server.host, port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
