//! Last-resort error handling: classify, report and shape escaped errors.
//!
//! Handlers return [`AppError`]; its response carries an [`ErrorReport`]
//! extension. [`shape_errors`] turns that into a JSON body for programmatic
//! callers or a redirect to an error page for browsers.

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::{AppError, ErrorReport, ErrorResponse},
    models::view::ErrorPage,
    services::alerts::RequestContext,
    AppState,
};

use super::temp_data::TempData;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// API and AJAX callers get JSON; everyone else is a page caller.
pub fn is_programmatic_request(headers: &HeaderMap, path: &str) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    let is_ajax = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");

    let is_api = path == "/api" || path.starts_with("/api/");

    accepts_json || is_ajax || is_api
}

pub fn error_page_path(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "/home/not-found",
        StatusCode::UNAUTHORIZED => "/home/unauthorized",
        StatusCode::FORBIDDEN => "/home/forbidden",
        _ => "/home/error",
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn request_context(request: &Request) -> RequestContext {
    let headers = request.headers();
    RequestContext {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        request_id: header_string(headers, REQUEST_ID_HEADER),
        user_agent: header_string(headers, header::USER_AGENT.as_str()),
        remote_ip: header_string(headers, "x-forwarded-for"),
    }
}

/// Middleware shaping every response that carries an [`ErrorReport`]
pub async fn shape_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let programmatic = is_programmatic_request(request.headers(), request.uri().path());
    let ctx = request_context(&request);

    let mut response = next.run(request).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    state.services.errors.report(&report, &ctx);
    let message = report.message_for(state.config.detailed_errors()).to_string();

    if programmatic {
        return json_error(&report, message, ctx.request_id);
    }

    let data = TempData {
        status_code: report.status.as_u16(),
        error_message: message.clone(),
        request_id: ctx.request_id.clone(),
    };

    match data.into_cookie() {
        Ok(cookie) => (
            StatusCode::FOUND,
            [(header::LOCATION, error_page_path(report.status))],
            CookieJar::new().add(cookie),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to stash error for redirect: {}", e);
            json_error(&report, message, ctx.request_id)
        }
    }
}

fn json_error(report: &ErrorReport, message: String, request_id: Option<String>) -> Response {
    let body = ErrorResponse::new(report.status, message, request_id);
    (report.status, Json(body)).into_response()
}

/// `CatchPanicLayer` handler: a panic is classified like any escaped error
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Panic(detail).into_response()
}

fn render_page(jar: CookieJar, default_status: StatusCode) -> (StatusCode, CookieJar, Json<ErrorPage>) {
    let (jar, data) = TempData::take(jar);

    let status = data
        .as_ref()
        .and_then(|d| StatusCode::from_u16(d.status_code).ok())
        .unwrap_or(default_status);

    let page = ErrorPage {
        status_code: status.as_u16(),
        user_friendly_message: ErrorPage::friendly_message(status.as_u16()).to_string(),
        request_id: data.as_ref().and_then(|d| d.request_id.clone()),
        error_message: data.map(|d| d.error_message),
    };

    (status, jar, Json(page))
}

/// Generic error page
#[utoipa::path(
    get,
    path = "/home/error",
    tag = "pages",
    responses((status = 500, description = "Error page", body = ErrorPage))
)]
pub async fn error_page(jar: CookieJar) -> impl IntoResponse {
    render_page(jar, StatusCode::INTERNAL_SERVER_ERROR)
}

#[utoipa::path(
    get,
    path = "/home/not-found",
    tag = "pages",
    responses((status = 404, description = "Not found page", body = ErrorPage))
)]
pub async fn not_found_page(jar: CookieJar) -> impl IntoResponse {
    render_page(jar, StatusCode::NOT_FOUND)
}

#[utoipa::path(
    get,
    path = "/home/unauthorized",
    tag = "pages",
    responses((status = 401, description = "Unauthorized page", body = ErrorPage))
)]
pub async fn unauthorized_page(jar: CookieJar) -> impl IntoResponse {
    render_page(jar, StatusCode::UNAUTHORIZED)
}

#[utoipa::path(
    get,
    path = "/home/forbidden",
    tag = "pages",
    responses((status = 403, description = "Forbidden page", body = ErrorPage))
)]
pub async fn forbidden_page(jar: CookieJar) -> impl IntoResponse {
    render_page(jar, StatusCode::FORBIDDEN)
}
