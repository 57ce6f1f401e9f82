//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyHealth {
    pub events_api: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "Healthy" or "Degraded"
    pub status: String,
    /// Version of the service
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub dependencies: DependencyHealth,
}

/// Health check endpoint, aggregating the Events API health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and Events API are healthy", body = HealthResponse),
        (status = 503, description = "Events API is unhealthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let api_healthy = state.services.events.is_api_healthy().await;

    let (status, label, dependency) = if api_healthy {
        (StatusCode::OK, "Healthy", "Healthy")
    } else {
        tracing::warn!("Health check degraded: Events API unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, "Degraded", "Unhealthy")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            dependencies: DependencyHealth {
                events_api: dependency.to_string(),
            },
        }),
    )
}
