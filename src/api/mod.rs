//! HTTP surface of the Events Portal

pub mod account;
pub mod errors;
pub mod events;
pub mod health;
pub mod openapi;
pub mod temp_data;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::Principal, AppState};

/// Extractor for the calling principal.
///
/// Reuses the principal resolved by a guard when there is one; otherwise
/// resolves it from the `x-api-key` header.
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(CurrentUser(principal.clone()));
        }

        let principal = Principal::from_headers(&parts.headers, &state.config.auth)?;
        Ok(CurrentUser(principal))
    }
}

/// Guard: any authenticated caller
pub async fn require_authenticated(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = Principal::from_headers(request.headers(), &state.config.auth)?;
    principal.require_authenticated()?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Guard: administrators only
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = Principal::from_headers(request.headers(), &state.config.auth)?;
    if let Err(e) = principal.require_admin() {
        tracing::warn!(
            "{} denied {} {}",
            principal.role,
            request.method(),
            request.uri().path()
        );
        return Err(e);
    }

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Routes served both at the root (pages) and under `/api`
fn resource_routes(state: &AppState) -> Router<AppState> {
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route(
            "/events",
            get(events::list_events).merge(post(events::create_event).route_layer(admin())),
        )
        .route(
            "/events/:id",
            get(events::get_event).merge(
                put(events::update_event)
                    .delete(events::delete_event)
                    .route_layer(admin()),
            ),
        )
        .route("/categories", get(events::list_categories))
}

/// Create the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let resources = resource_routes(&state);

    let api = resources.clone().route(
        "/me",
        get(account::me).route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authenticated,
        )),
    );

    let pages = Router::new()
        .route("/health", get(health::health_check))
        .route("/home/error", get(errors::error_page))
        .route("/home/not-found", get(errors::not_found_page))
        .route("/home/unauthorized", get(errors::unauthorized_page))
        .route("/home/forbidden", get(errors::forbidden_page));

    Router::new()
        .merge(resources)
        .merge(pages)
        .nest("/api", api)
        .with_state(state.clone())
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(errors::handle_panic))
        .layer(middleware::from_fn_with_state(state, errors::shape_errors))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}
