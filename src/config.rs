//! Application configuration.
//!
//! The reports API endpoint, fixed request headers, timeouts and the
//! documented rate limits live here, together with the on-device layout
//! of the app's data directory.
//!
//! ```
//! use anti_extortion_client_lib::config::{AppConfig, Environment};
//!
//! let config = AppConfig::for_environment(Environment::Production, "/tmp/app");
//! assert!(config.validate().is_ok());
//! assert!(config.recordings_dir().ends_with("recordings"));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://backendextorapp-production.up.railway.app/api/v1";
const DEFAULT_USER_AGENT: &str = "PoliciaApp/1.0 (Rust)";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 30_000;

pub const ENV_VAR_ENVIRONMENT: &str = "EXTORSION_ENV";
pub const ENV_VAR_API_URL: &str = "EXTORSION_API_URL";
pub const ENV_VAR_DATA_DIR: &str = "EXTORSION_DATA_DIR";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn api_url(&self) -> &'static str {
        DEFAULT_BASE_URL
    }

    pub fn debug(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    pub fn log_requests(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// A server-side request quota, shown to the user when they hit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window_minutes: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    pub reports: RateLimit,
    pub queries: RateLimit,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            reports: RateLimit {
                max_requests: 3,
                window_minutes: 1,
                message: "Máximo 3 reportes por minuto".to_string(),
            },
            queries: RateLimit {
                max_requests: 10,
                window_minutes: 1,
                message: "Máximo 10 consultas por minuto".to_string(),
            },
        }
    }
}

/// Reports API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
    pub upload_timeout_ms: u64,
    pub log_requests: bool,
    pub rate_limits: RateLimits,
}

impl ApiConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.api_url().to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            upload_timeout_ms: DEFAULT_UPLOAD_TIMEOUT_MS,
            log_requests: environment.log_requests(),
            rate_limits: RateLimits::default(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: "base URL cannot be empty".into(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: format!("expected an http(s) URL, got {base}"),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.request_timeout_ms".into(),
                reason: "timeout must be greater than zero".into(),
            });
        }
        if self.upload_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.upload_timeout_ms".into(),
                reason: "timeout must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Production)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn for_environment(environment: Environment, data_dir: impl AsRef<Path>) -> Self {
        Self {
            environment,
            api: ApiConfig::for_environment(environment),
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Build from `EXTORSION_*` environment variables, falling back to
    /// production settings and `default_data_dir`.
    pub fn from_env(default_data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let environment = match std::env::var(ENV_VAR_ENVIRONMENT) {
            Ok(value) => value.parse()?,
            Err(_) => Environment::Production,
        };
        let data_dir = std::env::var(ENV_VAR_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir.as_ref().to_path_buf());

        let mut config = Self::for_environment(environment, data_dir);
        if let Ok(url) = std::env::var(ENV_VAR_API_URL) {
            config.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data_dir".into(),
                reason: "data directory cannot be empty".into(),
            });
        }
        self.api.validate()
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("app.db")
    }

    pub fn recordings_dir(&self) -> PathBuf {
        self.data_dir.join("recordings")
    }

    /// Where captures are written before they are moved into the ledger.
    pub fn staging_dir(&self) -> PathBuf {
        self.data_dir.join("staging")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}
