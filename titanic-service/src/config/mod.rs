use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::{configuration_directory, load_settings, ServerSettings};
use service_core::error::AppError;
use std::path::{Path, PathBuf};

pub const SERVICE_DIR: &str = "titanic-service";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub auth: AuthSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelSettings {
    /// Serialized classifier loaded once at startup. Relative paths are
    /// resolved against the service directory.
    pub path: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    /// Shared secret expected in the `x-api-key` header of `/predict`.
    pub api_key: Secret<String>,
}

impl Settings {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "auth.api_key must not be empty"
            )));
        }
        Ok(())
    }
}

impl ModelSettings {
    fn resolve_against(&mut self, service_root: &Path) {
        if self.path.is_relative() {
            self.path = service_root.join(&self.path);
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let mut settings: Settings = load_settings(SERVICE_DIR)?;

    let base_path = std::env::current_dir()?;
    let config_dir = configuration_directory(&base_path, SERVICE_DIR);
    if let Some(service_root) = config_dir.parent() {
        settings.model.resolve_against(service_root);
    }

    settings.validate()?;
    Ok(settings)
}
