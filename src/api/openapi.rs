//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{account, errors, events, health};

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Events Portal API",
        version = "1.1.0",
        description = "Front-end gateway over the Events API. Every route under /events is also served under /api/events."
    ),
    modifiers(&ApiKeyAddon),
    paths(
        // Health
        health::health_check,
        // Events
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::list_categories,
        // Account
        account::me,
        // Error pages
        errors::error_page,
        errors::not_found_page,
        errors::unauthorized_page,
        errors::forbidden_page,
    ),
    components(
        schemas(
            // Domain
            crate::models::Event,
            crate::models::Category,
            crate::models::TicketCategory,
            crate::models::Principal,
            crate::models::Role,
            // Views
            crate::models::view::EventsPage,
            crate::models::view::EventListItem,
            crate::models::view::EventCard,
            crate::models::view::TicketCategoryView,
            crate::models::view::EventForm,
            crate::models::view::TicketCategoryInput,
            crate::models::view::ActionMessage,
            crate::models::view::ErrorPage,
            crate::models::view::AccountInfo,
            // Health
            health::HealthResponse,
            health::DependencyHealth,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Event browsing and administration"),
        (name = "account", description = "Current caller"),
        (name = "pages", description = "Error pages reached by redirect")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_form_schemas() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.schemas.contains_key("EventForm"));
        assert!(components.schemas.contains_key("TicketCategoryInput"));
        assert!(components.security_schemes.contains_key("api_key"));
        assert!(doc.paths.paths.contains_key("/events"));
    }
}
