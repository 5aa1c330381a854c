use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STORAGE_BACKEND: &str = "file";
const DEFAULT_MAX_BODY_SIZE: usize = 100 * 1024;
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port; the bare `PORT` variable overrides it
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Directory holding one `<resource>.json` file per collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// "file" or "memory"
    #[serde(default = "default_storage_backend")]
    #[validate(custom = "validate_storage_backend")]
    pub storage_backend: String,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    #[validate(range(min = 1024))]
    pub max_body_size: usize,

    /// CORS: comma-separated list of allowed origins; unset means any origin
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Give POSTed records without an `id` a sequential one
    #[serde(default)]
    pub assign_missing_ids: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            data_dir: default_data_dir(),
            storage_backend: default_storage_backend(),
            max_body_size: default_max_body_size(),
            cors_allowed_origins: None,
            assign_missing_ids: false,
        }
    }
}

impl AppConfig {
    /// Configuration for a file store rooted at `data_dir`, all else default.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.storage_backend.eq_ignore_ascii_case("memory")
    }

    /// Explicitly configured CORS origins, if any
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid PORT value '{0}'")]
    Port(String),
}

/// Default value functions
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_storage_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_storage_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "file" | "memory" => Ok(()),
        _ => {
            let mut err = ValidationError::new("storage_backend");
            err.message = Some("Must be one of: file, memory".into());
            Err(err)
        }
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("cssd_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Applies the bare `PORT` variable on top of the layered configuration.
fn apply_port_override(config: &mut AppConfig, raw: Option<String>) -> Result<(), AppConfigError> {
    if let Some(raw) = raw.filter(|value| !value.trim().is_empty()) {
        config.port = raw
            .trim()
            .parse()
            .map_err(|_| AppConfigError::Port(raw.clone()))?;
    }
    Ok(())
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
/// 5. The bare PORT variable
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let mut app_config: AppConfig = config.try_deserialize()?;
    apply_port_override(&mut app_config, env::var("PORT").ok())?;

    app_config.validate().map_err(|e| {
        tracing::error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_are_sensible_and_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.max_body_size, 100 * 1024);
        assert_eq!(cfg.storage_backend, "file");
        assert!(!cfg.assign_missing_ids);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn port_variable_overrides() {
        let mut cfg = AppConfig::default();
        apply_port_override(&mut cfg, Some("8088".into())).unwrap();
        assert_eq!(cfg.port, 8088);

        apply_port_override(&mut cfg, Some("  ".into())).unwrap();
        assert_eq!(cfg.port, 8088);

        assert_matches!(
            apply_port_override(&mut cfg, Some("http".into())),
            Err(AppConfigError::Port(_))
        );
    }

    #[test]
    fn unknown_backend_fails_validation() {
        let cfg = AppConfig {
            storage_backend: "redis".into(),
            ..AppConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("storage_backend"));
    }

    #[test]
    fn bad_log_level_and_tiny_body_limit_fail_validation() {
        let cfg = AppConfig {
            log_level: "verbose".into(),
            max_body_size: 10,
            ..AppConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));
        assert!(errors.field_errors().contains_key("max_body_size"));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let cfg = AppConfig {
            cors_allowed_origins: Some(" https://cssd.example.org , ,http://localhost:5173".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.cors_origins(),
            vec!["https://cssd.example.org", "http://localhost:5173"]
        );
        assert!(AppConfig::default().cors_origins().is_empty());
    }
}
