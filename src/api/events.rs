//! Event and category endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        view::{ActionMessage, EventCard, EventForm, EventsPage},
        Category, Event,
    },
    services::{events::WriteOutcome, mapping},
    upstream::Lookup,
    AppState,
};

use super::CurrentUser;

fn read_form(body: Result<Json<EventForm>, JsonRejection>) -> AppResult<EventForm> {
    body.map(|Json(form)| form)
        .map_err(|rejection| AppError::InvalidArgument(rejection.body_text()))
}

/// Forms that leave the owner blank are owned by the caller
fn fill_owner(event: &mut Event, user: &CurrentUser) {
    if event.owner_name.is_empty() {
        event.owner_name = user.0.name.clone();
    }
}

fn write_result(outcome: WriteOutcome, failure: &str) -> AppResult<()> {
    match outcome {
        WriteOutcome::Saved => Ok(()),
        WriteOutcome::Rejected(e) => Err(e.into()),
        WriteOutcome::Failed => Err(AppError::Upstream(failure.to_string())),
    }
}

/// List events with their category names
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    responses(
        (status = 200, description = "Event list; empty when the Events API is unavailable", body = EventsPage)
    )
)]
pub async fn list_events(State(state): State<AppState>) -> Json<EventsPage> {
    Json(state.services.events.events_page().await)
}

/// Get event details by ID
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event details", body = EventCard),
        (status = 404, description = "Event not found"),
        (status = 502, description = "Events API unavailable")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventCard>> {
    let event = match state.services.events.get_event_by_id(&id).await {
        Lookup::Found(event) => event,
        Lookup::NotFound => return Err(AppError::NotFound(format!("Event {id}"))),
        Lookup::Failed(e) => return Err(e.into()),
    };

    let categories = state.services.events.get_all_categories().await;
    Ok(Json(mapping::to_event_card(&event, &categories)))
}

/// Create an event (admin only)
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    security(("api_key" = [])),
    request_body = EventForm,
    responses(
        (status = 201, description = "Event created", body = ActionMessage),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 502, description = "Events API rejected the event")
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<EventForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ActionMessage>)> {
    let form = read_form(body)?;
    let mut event = mapping::event_from_form(&form, None)?;
    fill_owner(&mut event, &user);

    write_result(
        state.services.events.create_event(&event).await,
        "Unable to create event. Please try again.",
    )?;

    tracing::info!("Event '{}' created by {}", event.event_name, user.0.name);
    Ok((
        StatusCode::CREATED,
        Json(ActionMessage::ok("Event created successfully!")),
    ))
}

/// Update an event (admin only)
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "events",
    security(("api_key" = [])),
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    request_body = EventForm,
    responses(
        (status = 200, description = "Event updated", body = ActionMessage),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<EventForm>, JsonRejection>,
) -> AppResult<Json<ActionMessage>> {
    let form = read_form(body)?;
    let mut event = mapping::event_from_form(&form, Some(&id))?;
    fill_owner(&mut event, &user);

    write_result(
        state.services.events.update_event(&event).await,
        "Unable to update event. Please try again.",
    )?;

    Ok(Json(ActionMessage::ok("Event updated successfully!")))
}

/// Delete an event (admin only)
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    security(("api_key" = [])),
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event deleted", body = ActionMessage),
        (status = 403, description = "Not an administrator"),
        (status = 502, description = "Events API refused the deletion")
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ActionMessage>> {
    if !state.services.events.delete_event(&id).await {
        return Err(AppError::Upstream(
            "Unable to delete event. Please try again.".to_string(),
        ));
    }

    Ok(Json(ActionMessage::ok("Event deleted successfully!")))
}

/// List event categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "events",
    responses(
        (status = 200, description = "Category list", body = Vec<Category>)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.services.events.get_all_categories().await)
}
