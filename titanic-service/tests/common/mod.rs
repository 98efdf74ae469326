#![allow(dead_code)]

use axum::Router;
use secrecy::Secret;
use service_core::config::ServerSettings;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use titanic_service::config::{AuthSettings, ModelSettings, Settings};
use titanic_service::models::{FeatureVector, Prediction, PredictionError};
use titanic_service::services::{Classifier, ModelArtifact};
use titanic_service::startup::{build_router, Application};
use tempfile::NamedTempFile;
use titanic_service::AppState;

pub const TEST_API_KEY: &str = "test-api-key-123";

pub fn shipped_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/titanic_model.json")
}

pub fn test_settings(model_path: PathBuf) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
        },
        model: ModelSettings { path: model_path },
        auth: AuthSettings {
            api_key: Secret::new(TEST_API_KEY.to_string()),
        },
    }
}

/// Write `contents` to a temporary model file. The file is removed when the
/// returned handle is dropped, so keep it alive for the duration of the test.
pub fn write_artifact(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("titanic-model-")
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temporary model file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write test model");
    file.flush().expect("Failed to flush test model");
    file
}

/// Router over the shipped model, for in-process `oneshot` requests.
pub fn shipped_router() -> Router {
    let model = ModelArtifact::load(shipped_model_path()).expect("Shipped model must load");
    router_with(Arc::new(model))
}

pub fn router_with(classifier: Arc<dyn Classifier>) -> Router {
    build_router(AppState::new(
        classifier,
        Secret::new(TEST_API_KEY.to_string()),
    ))
}

/// Classifier that fails every prediction.
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _features: &FeatureVector) -> Result<Prediction, PredictionError> {
        Err(PredictionError::ModelFailure(
            "estimator is not fitted".to_string(),
        ))
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let app = Application::build(test_settings(shipped_model_path()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_predict(&self, api_key: Option<&str>, body: &str) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/predict", self.address))
            .header("content-type", "application/json")
            .body(body.to_string());
        if let Some(key) = api_key {
            request = request.header("x-api-key", key);
        }
        request.send().await.expect("Failed to execute request")
    }
}
