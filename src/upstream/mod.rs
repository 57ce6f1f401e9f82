//! HTTP client for the upstream Events API.
//!
//! Every call fails soft: reads return an empty collection or a [`Lookup`]
//! variant, writes return `false`. The reason is logged, never raised.

pub mod json;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::{page::Listing, user::API_KEY_HEADER},
};

const USER_AGENT: &str = concat!("EventsPortal/", env!("CARGO_PKG_VERSION"));

/// Why an upstream call did not produce a payload
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request to {path} timed out")]
    Timeout { path: String },

    #[error("Network error calling {path}: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {message}")]
    Status {
        path: String,
        status: StatusCode,
        message: &'static str,
    },

    #[error("Failed to parse response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid upstream path {path}: {message}")]
    InvalidPath { path: String, message: String },
}

impl UpstreamError {
    fn from_reqwest(path: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            UpstreamError::Timeout {
                path: path.to_string(),
            }
        } else {
            UpstreamError::Network {
                path: path.to_string(),
                source,
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        match &e {
            UpstreamError::Timeout { .. } => AppError::Timeout(e.to_string()),
            UpstreamError::Status { status, .. } if *status == StatusCode::REQUEST_TIMEOUT => {
                AppError::Timeout(e.to_string())
            }
            UpstreamError::Encode { .. } => AppError::Internal(e.to_string()),
            UpstreamError::InvalidPath { .. } => AppError::InvalidArgument(e.to_string()),
            _ => AppError::Upstream(e.to_string()),
        }
    }
}

/// User-facing description of a non-success upstream status
pub fn describe_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The requested information was not found.",
        StatusCode::UNAUTHORIZED => "You are not authorized to access this resource.",
        StatusCode::FORBIDDEN => "Access to this resource is forbidden.",
        StatusCode::BAD_REQUEST => "The request was invalid. Please check your input and try again.",
        StatusCode::INTERNAL_SERVER_ERROR => "A server error occurred. Please try again later.",
        StatusCode::SERVICE_UNAVAILABLE => {
            "The service is temporarily unavailable. Please try again later."
        }
        StatusCode::REQUEST_TIMEOUT => "The request timed out. Please try again.",
        _ => "An error occurred while communicating with the server.",
    }
}

/// Result of fetching a single resource
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(UpstreamError),
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(e) => Lookup::Failed(e),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Events API client
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    health_path: String,
}

impl UpstreamClient {
    /// Build the client from configuration. Fails only on configuration errors.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let base_url = config.events_api_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = config.events_api_key() {
            let mut value = HeaderValue::from_str(&key).map_err(|_| {
                AppError::Configuration(
                    "Events API key configuration contains invalid characters".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build HTTP client from configuration: {e}"))
            })?;

        Ok(Self {
            http,
            base_url,
            health_path: config.events_api.health_path.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UpstreamError::InvalidPath {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self.http.request(method, self.url(path)?);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        request
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(path, e))
    }

    fn check_status(path: &str, response: &reqwest::Response) -> Result<(), UpstreamError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status {
                path: path.to_string(),
                status,
                message: describe_status(status),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(path, e))?;

        json::from_slice(&bytes).map_err(|source| UpstreamError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// GET `path` and decode it, surfacing the failure reason
    pub async fn try_fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::check_status(path, &response)?;
        Self::decode(path, response).await
    }

    /// GET a collection. Accepts a bare array or a paginated envelope.
    /// Any failure yields an empty list.
    pub async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        tracing::info!("Fetching {} from Events API", path);

        match self.try_fetch::<Listing<T>>(path).await {
            Ok(listing) => {
                let items = listing.into_items();
                tracing::info!("Successfully retrieved {} items from {}", items.len(), path);
                items
            }
            Err(e) => {
                tracing::warn!("API request failed: {}", e);
                Vec::new()
            }
        }
    }

    /// GET a single resource; 404 is reported apart from other failures
    pub async fn fetch_one<T: DeserializeOwned>(&self, path: &str) -> Lookup<T> {
        tracing::info!("Fetching {} from Events API", path);

        let response = match self.send(Method::GET, path, None).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("API request failed: {}", e);
                return Lookup::Failed(e);
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("{} not found", path);
            return Lookup::NotFound;
        }

        let result = match Self::check_status(path, &response) {
            Ok(()) => Self::decode(path, response).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => {
                tracing::info!("Successfully retrieved {}", path);
                Lookup::Found(value)
            }
            Err(e) => {
                tracing::warn!("API request failed: {}", e);
                Lookup::Failed(e)
            }
        }
    }

    async fn write<B: Serialize + ?Sized>(&self, method: Method, path: &str, payload: Option<&B>) -> bool {
        tracing::info!("{} {} on Events API", method, path);

        let body = match payload.map(serde_json::to_vec).transpose() {
            Ok(body) => body,
            Err(source) => {
                let e = UpstreamError::Encode {
                    path: path.to_string(),
                    source,
                };
                tracing::error!("{}", e);
                return false;
            }
        };

        let outcome = match self.send(method.clone(), path, body).await {
            Ok(response) => Self::check_status(path, &response),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                tracing::info!("{} {} succeeded", method, path);
                true
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", method, path, e);
                false
            }
        }
    }

    /// POST `payload`; `true` only on a 2xx answer
    pub async fn create<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> bool {
        self.write(Method::POST, path, Some(payload)).await
    }

    /// PUT `payload`; `true` only on a 2xx answer
    pub async fn update<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> bool {
        self.write(Method::PUT, path, Some(payload)).await
    }

    /// DELETE; `true` only on a 2xx answer
    pub async fn delete(&self, path: &str) -> bool {
        self.write::<()>(Method::DELETE, path, None).await
    }

    /// Upstream health probe. Never fails: any error counts as unhealthy.
    pub async fn health_check(&self) -> bool {
        match self.send(Method::GET, &self.health_path, None).await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(
                    "Events API health check returned HTTP {}",
                    response.status()
                );
                false
            }
            Err(e) => {
                tracing::warn!("Events API health check failed: {}", e);
                false
            }
        }
    }
}
