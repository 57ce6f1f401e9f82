//! Configuration management for the Events Portal

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Base URL used when running in development without an explicit one
pub const DEVELOPMENT_BASE_URL: &str = "https://localhost:7103";

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationConfig {
    /// Environment name ("Development", "Production", ...)
    pub environment: String,
    pub enable_detailed_errors: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventsApiConfig {
    pub base_url: Option<String>,
    /// Key sent upstream in `x-api-key`. `EVENTS_API_KEY` overrides the file value.
    pub api_key: Option<String>,
    pub timeout_seconds: i64,
    pub health_path: String,
}

/// Keys accepted from inbound callers
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub admin_api_key: Option<String>,
    pub user_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: ApplicationConfig,
    #[serde(default)]
    pub events_api: EventsApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix PORTAL_ (e.g. PORTAL_SERVER__PORT)
            .add_source(
                Environment::with_prefix("PORTAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("events_api.api_key", env::var("EVENTS_API_KEY").ok())?
            .set_override_option("events_api.base_url", env::var("EVENTS_API_BASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.app.environment.eq_ignore_ascii_case("development")
    }

    pub fn environment_name(&self) -> &str {
        &self.app.environment
    }

    /// Whether escaped errors carry their detail back to the caller
    pub fn detailed_errors(&self) -> bool {
        self.is_development() || self.app.enable_detailed_errors
    }

    /// Resolve the upstream base URL, falling back to the development default.
    pub fn events_api_base_url(&self) -> AppResult<Url> {
        let configured = self
            .events_api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let raw = match configured {
            Some(url) => url,
            None if self.is_development() => {
                tracing::warn!("No API base URL configured, using development default");
                DEVELOPMENT_BASE_URL
            }
            None => {
                return Err(AppError::Configuration(
                    "Events API base URL is not configured".to_string(),
                ))
            }
        };

        // Joining relative paths needs a trailing slash on the base.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };

        Url::parse(&normalized).map_err(|e| {
            AppError::Configuration(format!("Invalid Events API base URL configuration '{raw}': {e}"))
        })
    }

    /// Upstream API key, if any. A missing key is allowed but logged.
    pub fn events_api_key(&self) -> Option<String> {
        let key = self
            .events_api
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        if key.is_none() {
            tracing::warn!("No API key configured - upstream calls are sent unauthenticated");
        }
        key
    }

    /// Upstream timeout clamped to [5s, 300s]
    pub fn api_timeout(&self) -> Duration {
        let requested = self.events_api.timeout_seconds;
        let seconds = if requested < MIN_TIMEOUT_SECS as i64 {
            tracing::warn!(
                "API timeout too low ({}s), using minimum of {}s",
                requested,
                MIN_TIMEOUT_SECS
            );
            MIN_TIMEOUT_SECS
        } else if requested > MAX_TIMEOUT_SECS as i64 {
            tracing::warn!(
                "API timeout too high ({}s), using maximum of {}s",
                requested,
                MAX_TIMEOUT_SECS
            );
            MAX_TIMEOUT_SECS
        } else {
            requested.unsigned_abs()
        };

        Duration::from_secs(seconds)
    }

    /// Check the upstream settings and log every problem found.
    pub fn validate(&self) -> bool {
        let mut problems = Vec::new();

        match self.events_api_base_url() {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                problems.push(format!("Invalid API base URL: {url}"));
            }
            Ok(_) => {}
            Err(e) => problems.push(format!("API base URL validation failed: {e}")),
        }

        if !self.is_development() && self.events_api_key().is_none() {
            problems.push("API key is required in production".to_string());
        }

        if problems.is_empty() {
            tracing::info!("Configuration validation passed");
            true
        } else {
            tracing::error!("Configuration validation failed: {}", problems.join(", "));
            false
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            environment: "Production".to_string(),
            enable_detailed_errors: false,
        }
    }
}

impl Default for EventsApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_seconds: 30,
            health_path: "api/health".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
