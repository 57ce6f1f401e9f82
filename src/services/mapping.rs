//! Conversions between Events API DTOs, the domain model and view projections.
//!
//! Inbound mapping never fails: absent or malformed payloads become default
//! domain objects and a warning. Outbound mapping is strict and returns a
//! [`MappingError`] before anything is sent upstream.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        event::{parse_time, DEFAULT_STATUS},
        non_blank,
        view::{EventCard, EventForm, EventListItem, TicketCategoryInput, TicketCategoryView},
        Category, CategoryDto, CreateEventDto, CreateTicketCategoryDto, Event, EventDto,
        TicketCategory, TicketCategoryDto, UpdateEventDto,
    },
    upstream::json,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const UNCATEGORIZED: &str = "Uncategorized";

/// Time used when a date arrives without one
pub fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Outbound validation failure. Terminal for the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid category ID '{0}'")]
    InvalidCategoryId(String),

    #[error("Invalid event date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid event time '{0}', expected HH:MM")]
    InvalidTime(String),
}

impl From<MappingError> for AppError {
    fn from(e: MappingError) -> Self {
        match e {
            MappingError::MissingField(_) => AppError::MissingArgument(e.to_string()),
            _ => AppError::InvalidArgument(e.to_string()),
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Parse a combined upstream timestamp, keeping its wall-clock time
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Accepts "YYYY-MM-DD" or a timestamp whose date part is wanted
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(value).map(|dt| dt.date()))
}

/// Split the DTO schedule into date and time strings.
///
/// The combined timestamp wins when present and parseable. A date without a
/// time is scheduled at midday.
fn split_schedule(dto: &EventDto) -> (String, String) {
    if let Some(raw) = non_blank(dto.resolved_timestamp()) {
        match parse_timestamp(&raw) {
            Some(at) => {
                return (
                    at.date().format(DATE_FORMAT).to_string(),
                    at.time().format(TIME_FORMAT).to_string(),
                )
            }
            None => tracing::warn!("Unparseable event timestamp '{}', using split fields", raw),
        }
    }

    let Some(raw_date) = non_blank(dto.event_date.as_deref()) else {
        return (String::new(), String::new());
    };

    let date = parse_date(&raw_date)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or(raw_date);

    let time = match non_blank(dto.event_time.as_deref()) {
        Some(raw_time) => parse_time(&raw_time)
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or(raw_time),
        None => midday().format(TIME_FORMAT).to_string(),
    };

    (date, time)
}

pub fn map_to_event(dto: Option<&EventDto>) -> Event {
    let Some(dto) = dto else {
        tracing::warn!("Attempted to map null EventDto");
        return Event::default();
    };

    let (event_date, event_time) = split_schedule(dto);

    Event {
        event_id: dto.resolved_id().unwrap_or_default().to_string(),
        event_name: non_blank(dto.resolved_title()).unwrap_or_default(),
        category_id: dto.resolved_category_id().unwrap_or_default().to_string(),
        description: non_blank(dto.description.as_deref()),
        owner_id: non_blank(dto.owner_id.as_deref()).unwrap_or_default(),
        owner_name: non_blank(dto.owner_name.as_deref()).unwrap_or_default(),
        owner_email: non_blank(dto.owner_email.as_deref()).unwrap_or_default(),
        location: non_blank(dto.location.as_deref()).unwrap_or_default(),
        venue_name: non_blank(dto.venue_name.as_deref()),
        event_date,
        event_time,
        capacity: clamp_count(dto.capacity),
        tickets_sold: clamp_count(dto.tickets_sold),
        status: non_blank(dto.status.as_deref()).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        ticket_categories: dto
            .ticket_categories
            .iter()
            .map(|t| map_to_ticket_category(Some(t)))
            .collect(),
    }
}

/// Map a raw upstream record. Records that are not objects yield a default event.
pub fn event_from_value(value: &Value) -> Event {
    match json::from_value::<EventDto>(value.clone()) {
        Ok(dto) => map_to_event(Some(&dto)),
        Err(e) => {
            tracing::warn!("Malformed event payload: {}", e);
            Event::default()
        }
    }
}

pub fn map_to_category(dto: Option<&CategoryDto>) -> Category {
    let Some(dto) = dto else {
        tracing::warn!("Attempted to map null CategoryDto");
        return Category::default();
    };

    Category {
        category_id: dto.resolved_id().unwrap_or_default().to_string(),
        name: non_blank(dto.name.as_deref()).unwrap_or_default(),
        description: non_blank(dto.description.as_deref()),
        color: non_blank(dto.resolved_color()),
        is_active: true,
    }
}

pub fn map_to_ticket_category(dto: Option<&TicketCategoryDto>) -> TicketCategory {
    let Some(dto) = dto else {
        tracing::warn!("Attempted to map null TicketCategoryDto");
        return TicketCategory::default();
    };

    let mut ticket = TicketCategory {
        category: non_blank(dto.resolved_label()).unwrap_or_default(),
        price: dto.price.max(Decimal::ZERO),
        available_quantity: i32::try_from(dto.available_quantity)
            .unwrap_or(if dto.available_quantity < 0 { -1 } else { i32::MAX }),
        description: non_blank(dto.description.as_deref()).unwrap_or_default(),
        max_per_customer: dto
            .max_per_customer
            .filter(|cap| *cap > 0)
            .map(clamp_count),
        is_available: dto.is_purchasable(),
        sale_start_date: dto.sale_start_date,
        sale_end_date: dto.sale_end_date,
        ..TicketCategory::default()
    };

    if let Some(id) = dto.resolved_id() {
        ticket.ticket_id = id.to_string();
    }
    ticket
}

/// Domain event back to its wire shape
pub fn map_to_event_dto(event: &Event) -> EventDto {
    EventDto {
        event_id: non_blank(Some(event.event_id.as_str())),
        title: Some(event.event_name.clone()),
        category_id: non_blank(Some(event.category_id.as_str())),
        description: event.description.clone(),
        owner_id: Some(event.owner_id.clone()),
        owner_name: Some(event.owner_name.clone()),
        owner_email: Some(event.owner_email.clone()),
        location: Some(event.location.clone()),
        venue_name: event.venue_name.clone(),
        date: event
            .event_date_time()
            .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string()),
        event_date: non_blank(Some(event.event_date.as_str())),
        event_time: non_blank(Some(event.event_time.as_str())),
        capacity: i64::from(event.capacity),
        tickets_sold: i64::from(event.tickets_sold),
        status: Some(event.status.clone()),
        ..EventDto::default()
    }
}

/// The Events API keys categories by positive integer
pub fn parse_category_id(raw: &str) -> Result<i32, MappingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MappingError::MissingField("Category"));
    }
    match trimmed.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(MappingError::InvalidCategoryId(trimmed.to_string())),
    }
}

/// Combine the split schedule strings; a blank time means midday
pub fn schedule_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, MappingError> {
    let date = date.trim();
    if date.is_empty() {
        return Err(MappingError::MissingField("Event date"));
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| MappingError::InvalidDate(date.to_string()))?;

    let time = if time.trim().is_empty() {
        midday()
    } else {
        parse_time(time).ok_or_else(|| MappingError::InvalidTime(time.trim().to_string()))?
    };

    Ok(date.and_time(time))
}

fn require(value: &str, field: &'static str) -> Result<String, MappingError> {
    non_blank(Some(value)).ok_or(MappingError::MissingField(field))
}

pub fn build_create_event(event: &Event) -> Result<CreateEventDto, MappingError> {
    let event_name = require(&event.event_name, "Event name")?;
    let location = require(&event.location, "Location")?;
    let category_id = parse_category_id(&event.category_id)?;
    let at = schedule_timestamp(&event.event_date, &event.event_time)?;

    let ticket_categories = event
        .ticket_categories
        .iter()
        .filter(|t| !t.category.trim().is_empty())
        .map(|t| CreateTicketCategoryDto {
            ticket_category: t.category.trim().to_string(),
            price: t.price.max(Decimal::ZERO),
            available_quantity: t.available_quantity,
            description: t.description.clone(),
        })
        .collect();

    Ok(CreateEventDto {
        event_name,
        category_id,
        description: event.description.clone(),
        owner_id: event.owner_id.clone(),
        owner_name: event.owner_name.clone(),
        owner_email: event.owner_email.clone(),
        location,
        venue_name: event.venue_name.clone().unwrap_or_default(),
        event_date: at.date().format(DATE_FORMAT).to_string(),
        event_time: at.time().format(TIME_FORMAT).to_string(),
        capacity: event.capacity,
        status: non_blank(Some(event.status.as_str())).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        ticket_categories,
    })
}

pub fn build_update_event(event: &Event) -> Result<UpdateEventDto, MappingError> {
    require(&event.event_id, "Event ID")?;

    Ok(UpdateEventDto {
        title: require(&event.event_name, "Event name")?,
        location: require(&event.location, "Location")?,
        category_id: parse_category_id(&event.category_id)?,
        date: schedule_timestamp(&event.event_date, &event.event_time)?,
        description: event.description.clone(),
        venue_name: event.venue_name.clone(),
        capacity: event.capacity,
        status: non_blank(Some(event.status.as_str())).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
    })
}

/// Category id to name
pub fn category_lookup(categories: &[Category]) -> HashMap<&str, &str> {
    categories
        .iter()
        .filter(|c| !c.category_id.is_empty())
        .map(|c| (c.category_id.as_str(), c.display_name()))
        .collect()
}

fn category_name(lookup: &HashMap<&str, &str>, category_id: &str) -> String {
    lookup
        .get(category_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

pub fn to_ticket_view(ticket: &TicketCategory) -> TicketCategoryView {
    TicketCategoryView {
        ticket_id: ticket.ticket_id.clone(),
        ticket_category: ticket.category.clone(),
        price: ticket.price,
        available_quantity: ticket.available_quantity,
        description: ticket.description.clone(),
        formatted_price: ticket.formatted_price(),
        availability_message: TicketCategoryView::availability_message_for(
            ticket.available_quantity,
        ),
        is_purchasable: ticket.is_currently_available(),
    }
}

pub fn to_list_item(event: &Event, lookup: &HashMap<&str, &str>) -> EventListItem {
    EventListItem {
        event_id: event.event_id.clone(),
        event_name: event.event_name.clone(),
        event_category: category_name(lookup, &event.category_id),
        description: event.description.clone().unwrap_or_default(),
        location: event.location.clone(),
        venue_name: event.venue_name.clone().unwrap_or_default(),
        event_date: event.event_date.clone(),
        event_time: event.event_time.clone(),
        tickets_sold: event.tickets_sold,
        capacity: event.capacity,
        tickets_sold_percentage: event.tickets_sold_percentage(),
        ticket_categories: event.ticket_categories.iter().map(to_ticket_view).collect(),
    }
}

pub fn to_list_items(events: &[Event], categories: &[Category]) -> Vec<EventListItem> {
    let lookup = category_lookup(categories);
    events.iter().map(|e| to_list_item(e, &lookup)).collect()
}

pub fn to_event_card_at(event: &Event, categories: &[Category], now: NaiveDateTime) -> EventCard {
    let lookup = category_lookup(categories);

    let mut card = EventCard {
        event_id: event.event_id.clone(),
        event_name: event.event_name.clone(),
        description: event.description.clone().unwrap_or_default(),
        event_category: category_name(&lookup, &event.category_id),
        event_date: parse_date(&event.event_date),
        event_time: parse_time(&event.event_time),
        location: event.location.clone(),
        venue_name: event.venue_name.clone().unwrap_or_default(),
        status: event.status.clone(),
        capacity: event.capacity,
        tickets_sold: event.tickets_sold,
        tickets_sold_percentage: event.tickets_sold_percentage(),
        has_available_tickets: event.has_available_tickets(),
        is_upcoming: false,
        days_until_event: 0,
        relative_time: String::new(),
        ticket_categories: event.ticket_categories.iter().map(to_ticket_view).collect(),
    };

    card.is_upcoming = card.is_upcoming_at(now);
    card.days_until_event = card.days_until_event_at(now);
    card.relative_time = EventCard::relative_time_description(card.days_until_event);
    card
}

pub fn to_event_card(event: &Event, categories: &[Category]) -> EventCard {
    to_event_card_at(event, categories, Utc::now().naive_utc())
}

fn ticket_from_input(input: &TicketCategoryInput) -> TicketCategory {
    let mut ticket = TicketCategory {
        category: input.ticket_category.trim().to_string(),
        price: input.price.max(Decimal::ZERO),
        available_quantity: input.available_quantity,
        description: input.description.clone(),
        max_per_customer: input.max_per_customer.filter(|cap| *cap > 0),
        ..TicketCategory::default()
    };
    if let Some(id) = non_blank(input.ticket_id.as_deref()) {
        ticket.ticket_id = id;
    }
    ticket
}

/// Validate a submitted form and turn it into a domain event.
///
/// `event_id` is taken from the route for edits and overrides the form value.
pub fn event_from_form(form: &EventForm, event_id: Option<&str>) -> AppResult<Event> {
    form.validate()?;

    let event_date = form.event_date.trim().to_string();
    let event_time = non_blank(form.event_time.as_deref()).unwrap_or_default();
    // Reject malformed schedules before anything reaches the upstream
    schedule_timestamp(&event_date, &event_time)?;

    Ok(Event {
        event_id: event_id
            .map(str::to_string)
            .or_else(|| non_blank(form.event_id.as_deref()))
            .unwrap_or_default(),
        event_name: form.event_name.trim().to_string(),
        category_id: form.event_category.trim().to_string(),
        description: non_blank(form.description.as_deref()),
        owner_id: non_blank(form.owner_id.as_deref()).unwrap_or_default(),
        owner_name: non_blank(form.owner_name.as_deref()).unwrap_or_default(),
        owner_email: non_blank(form.owner_email.as_deref()).unwrap_or_default(),
        location: form.location.trim().to_string(),
        venue_name: non_blank(form.venue_name.as_deref()),
        event_date,
        event_time: if event_time.is_empty() {
            midday().format(TIME_FORMAT).to_string()
        } else {
            event_time
        },
        capacity: form.capacity,
        tickets_sold: 0,
        status: non_blank(form.status.as_deref()).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        ticket_categories: form.ticket_categories.iter().map(ticket_from_input).collect(),
    })
}
