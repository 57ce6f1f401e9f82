//! Business logic services

pub mod alerts;
pub mod events;
pub mod mapping;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, upstream::UpstreamClient};

use alerts::{AlertSink, ErrorReporter, NoopAlertSink};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub events: events::EventsService,
    pub errors: ErrorReporter,
}

impl Services {
    /// Create all services with the default (no-op) alert sink
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_alert_sink(config, Arc::new(NoopAlertSink))
    }

    pub fn with_alert_sink(config: &AppConfig, sink: Arc<dyn AlertSink>) -> AppResult<Self> {
        let client = UpstreamClient::new(config)?;
        tracing::info!("Events API client targeting {}", client.base_url());

        Ok(Self {
            events: events::EventsService::new(client),
            errors: ErrorReporter::new(sink, config.is_development()),
        })
    }
}
