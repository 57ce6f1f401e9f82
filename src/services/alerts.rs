//! Escaped-error reporting and critical alerting

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{ErrorClass, ErrorReport};

/// Critical error handed to the alerting sink
#[derive(Debug, Clone)]
pub struct CriticalAlert {
    pub class: ErrorClass,
    pub detail: String,
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// Out-of-band notification channel for critical errors
#[cfg_attr(test, mockall::automock)]
pub trait AlertSink: Send + Sync {
    fn notify(&self, alert: &CriticalAlert);
}

/// Default sink: records that an alert would have been raised
pub struct NoopAlertSink;

impl AlertSink for NoopAlertSink {
    fn notify(&self, alert: &CriticalAlert) {
        tracing::debug!(
            "No alert sink configured, dropping alert for {} {}",
            alert.method,
            alert.path
        );
    }
}

/// Request facts logged with every escaped error
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub user_agent: Option<String>,
    pub remote_ip: Option<String>,
}

#[derive(Clone)]
pub struct ErrorReporter {
    sink: Arc<dyn AlertSink>,
    development: bool,
}

impl ErrorReporter {
    pub fn new(sink: Arc<dyn AlertSink>, development: bool) -> Self {
        Self { sink, development }
    }

    /// Log an escaped error; critical ones are also alerted outside development.
    pub fn report(&self, report: &ErrorReport, ctx: &RequestContext) {
        let request_id = ctx.request_id.as_deref().unwrap_or("-");

        if report.status.is_server_error() {
            tracing::error!(
                method = %ctx.method,
                path = %ctx.path,
                request_id,
                user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
                remote_ip = ctx.remote_ip.as_deref().unwrap_or("-"),
                status = report.status.as_u16(),
                "Unhandled error: {}",
                report.detail
            );
        } else {
            tracing::warn!(
                method = %ctx.method,
                path = %ctx.path,
                request_id,
                status = report.status.as_u16(),
                "Request failed: {}",
                report.detail
            );
        }

        if report.critical && !self.development {
            tracing::error!(request_id, "CRITICAL ERROR: {}", report.detail);
            self.sink.notify(&CriticalAlert {
                class: report.class,
                detail: report.detail.clone(),
                method: ctx.method.clone(),
                path: ctx.path.clone(),
                request_id: ctx.request_id.clone(),
                at: Utc::now(),
            });
        }
    }
}
