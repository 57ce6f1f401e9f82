//! Error types for the Events Portal

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Fixed classification every escaped error falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    MissingArgument,
    InvalidArgument,
    Unauthenticated,
    NotFound,
    Forbidden,
    Configuration,
    UpstreamUnavailable,
    Timeout,
    NotImplemented,
    Unexpected,
}

impl ErrorClass {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorClass::MissingArgument | ErrorClass::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorClass::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Forbidden => StatusCode::FORBIDDEN,
            ErrorClass::Configuration | ErrorClass::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorClass::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorClass::Timeout => StatusCode::REQUEST_TIMEOUT,
            ErrorClass::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// User-safe message; `None` for the environment-sensitive fallback.
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            ErrorClass::MissingArgument => Some("Required information is missing."),
            ErrorClass::InvalidArgument => Some("Invalid information provided."),
            ErrorClass::Unauthenticated => Some("You are not authorized to access this resource."),
            ErrorClass::NotFound => Some("The requested resource was not found."),
            ErrorClass::Forbidden => Some("Access to this resource is forbidden."),
            ErrorClass::Configuration => {
                Some("A configuration error has occurred. Please contact support.")
            }
            ErrorClass::UpstreamUnavailable => {
                Some("Unable to communicate with external services. Please try again later.")
            }
            ErrorClass::Timeout => Some("The request timed out. Please try again."),
            ErrorClass::NotImplemented => Some("This feature is not yet available."),
            ErrorClass::Unexpected => None,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Malformed input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Handler panicked: {0}")]
    Panic(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::MissingArgument(_) => ErrorClass::MissingArgument,
            AppError::InvalidArgument(_) => ErrorClass::InvalidArgument,
            AppError::Authentication(_) => ErrorClass::Unauthenticated,
            AppError::NotFound(_) => ErrorClass::NotFound,
            AppError::Authorization(_) => ErrorClass::Forbidden,
            AppError::Configuration(_) => ErrorClass::Configuration,
            AppError::InvalidOperation(msg) if msg.to_lowercase().contains("configuration") => {
                ErrorClass::Configuration
            }
            AppError::Upstream(_) => ErrorClass::UpstreamUnavailable,
            AppError::Timeout(_) => ErrorClass::Timeout,
            AppError::NotImplemented(_) => ErrorClass::NotImplemented,
            AppError::InvalidOperation(_)
            | AppError::Json(_)
            | AppError::Panic(_)
            | AppError::Internal(_) => ErrorClass::Unexpected,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.class().status()
    }

    /// Message shown to the caller. `detailed` exposes the error text for
    /// the unclassified fallback only.
    pub fn user_message(&self, detailed: bool) -> String {
        if let Some(message) = self.class().user_message() {
            return message.to_string();
        }

        if detailed {
            return format!("Error: {}", self);
        }

        match self {
            AppError::Json(_) => "Invalid input provided.",
            AppError::InvalidOperation(_) => "The requested operation could not be completed.",
            _ => "An unexpected error occurred. Please try again later.",
        }
        .to_string()
    }

    /// Errors that warrant out-of-band alerting
    pub fn is_critical(&self) -> bool {
        matches!(self.class(), ErrorClass::Configuration) || matches!(self, AppError::Panic(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let missing = e
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .any(|error| error.code == "required");

        if missing {
            AppError::MissingArgument(e.to_string())
        } else {
            AppError::InvalidArgument(e.to_string())
        }
    }
}

/// Classified error attached to the response so the pipeline can reshape it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub class: ErrorClass,
    pub message: String,
    pub detailed_message: String,
    pub detail: String,
    pub critical: bool,
}

impl ErrorReport {
    pub fn from_error(error: &AppError) -> Self {
        Self {
            status: error.status(),
            class: error.class(),
            message: error.user_message(false),
            detailed_message: error.user_message(true),
            detail: error.to_string(),
            critical: error.is_critical(),
        }
    }

    pub fn message_for(&self, detailed: bool) -> &str {
        if detailed {
            &self.detailed_message
        } else {
            &self.message
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            status_code: status.as_u16(),
            timestamp: Utc::now(),
            request_id,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from_error(&self);
        let body = ErrorResponse::new(report.status, report.message.clone(), None);

        let mut response = (report.status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
