//! Caller identity resolved from the inbound `x-api-key` header

use axum::http::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{config::AuthConfig, error::AppError};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum Role {
    Guest,
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated (or anonymous) caller
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Principal {
    pub name: String,
    pub role: Role,
    pub api_key_access: bool,
}

impl Principal {
    pub fn guest() -> Self {
        Self {
            name: "Guest User".to_string(),
            role: Role::Guest,
            api_key_access: false,
        }
    }

    /// Resolve the caller from request headers.
    ///
    /// No key (or a blank one) yields a guest. A key matching neither the
    /// admin nor the user key is rejected.
    pub fn from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Result<Self, AppError> {
        let provided = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty());

        let Some(provided) = provided else {
            return Ok(Self::guest());
        };

        let matches = |configured: &Option<String>| {
            configured
                .as_deref()
                .is_some_and(|key| !key.is_empty() && key == provided)
        };

        if matches(&auth.admin_api_key) {
            tracing::debug!("Admin authenticated with API key");
            Ok(Self {
                name: "Admin User".to_string(),
                role: Role::Admin,
                api_key_access: true,
            })
        } else if matches(&auth.user_api_key) {
            tracing::debug!("User authenticated with API key");
            Ok(Self {
                name: "Standard User".to_string(),
                role: Role::User,
                api_key_access: true,
            })
        } else {
            let prefix: String = provided.chars().take(8).collect();
            tracing::warn!("Invalid API key provided: {}...", prefix);
            Err(AppError::Authentication("Invalid API key".to_string()))
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.role != Role::Guest
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_authenticated(&self) -> Result<(), AppError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::Authentication("Authentication required".to_string()))
        }
    }

    /// Guests are unauthenticated (401); other non-admins are forbidden (403).
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_authenticated()?;
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}
