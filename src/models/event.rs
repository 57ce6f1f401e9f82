//! Event model and the DTOs exchanged with the Events API

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use utoipa::ToSchema;

use super::ticket_category::{CreateTicketCategoryDto, TicketCategory, TicketCategoryDto};

pub const DEFAULT_STATUS: &str = "Draft";

/// Event as the Events API exchanges it.
///
/// Upstream versions disagree on naming and on the schedule shape: some send
/// a combined `date` timestamp, others `eventDate` + `eventTime` strings.
/// Both are accepted here; the mapper reconciles them.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct EventDto {
    #[serde(deserialize_with = "super::lenient_id")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "super::lenient_id", skip_serializing)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub title: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing)]
    pub event_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing)]
    pub name: Option<String>,
    #[serde(deserialize_with = "super::lenient_id")]
    pub category_id: Option<String>,
    #[serde(deserialize_with = "super::lenient_id", skip_serializing)]
    pub event_category: Option<String>,
    #[serde(deserialize_with = "super::lenient_id", skip_serializing)]
    pub category: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub description: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub owner_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub owner_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub owner_email: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub location: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub venue_name: Option<String>,
    /// Combined timestamp ("2025-03-01T19:30:00")
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing)]
    pub event_date_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub capacity: i64,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub tickets_sold: i64,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub status: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing)]
    pub ticket_categories: Vec<TicketCategoryDto>,
}

/// Upstream versions name some fields differently. Each accessor returns the
/// first spelling present, in the order listed.
impl EventDto {
    /// `eventId`, `id`
    pub fn resolved_id(&self) -> Option<&str> {
        self.event_id.as_deref().or(self.id.as_deref())
    }

    /// `title`, `eventName`, `name`
    pub fn resolved_title(&self) -> Option<&str> {
        [&self.title, &self.event_name, &self.name]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.trim().is_empty()))
    }

    /// `categoryId`, `eventCategory`, `category`
    pub fn resolved_category_id(&self) -> Option<&str> {
        [&self.category_id, &self.event_category, &self.category]
            .into_iter()
            .find_map(|v| v.as_deref())
    }

    /// `date`, `eventDateTime`
    pub fn resolved_timestamp(&self) -> Option<&str> {
        [&self.date, &self.event_date_time]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// `POST /api/events` body. The upstream keys categories by integer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventDto {
    pub event_name: String,
    pub category_id: i32,
    pub description: Option<String>,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub location: String,
    pub venue_name: String,
    pub event_date: String,
    pub event_time: String,
    pub capacity: u32,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticket_categories: Vec<CreateTicketCategoryDto>,
}

/// `PUT /api/events/{id}` body
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventDto {
    pub title: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub description: Option<String>,
    pub category_id: i32,
    pub venue_name: Option<String>,
    pub capacity: u32,
    pub status: String,
}

/// Event (domain).
///
/// Date and time are kept as two strings ("YYYY-MM-DD", "HH:MM") the way
/// forms and the upstream hand them over.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Event {
    pub event_id: String,
    pub event_name: String,
    pub category_id: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub location: String,
    pub venue_name: Option<String>,
    pub event_date: String,
    pub event_time: String,
    /// 0 means unlimited
    pub capacity: u32,
    pub tickets_sold: u32,
    pub status: String,
    pub ticket_categories: Vec<TicketCategory>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            event_id: String::new(),
            event_name: String::new(),
            category_id: String::new(),
            description: None,
            owner_id: String::new(),
            owner_name: String::new(),
            owner_email: String::new(),
            location: String::new(),
            venue_name: None,
            event_date: String::new(),
            event_time: String::new(),
            capacity: 0,
            tickets_sold: 0,
            status: DEFAULT_STATUS.to_string(),
            ticket_categories: Vec::new(),
        }
    }
}

impl Event {
    /// Date and time combined, if both parse
    pub fn event_date_time(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.event_date.trim(), "%Y-%m-%d").ok()?;
        let time = parse_time(&self.event_time)?;
        Some(date.and_time(time))
    }

    pub fn has_available_tickets(&self) -> bool {
        self.capacity == 0 || self.tickets_sold < self.capacity
    }

    /// Share of capacity sold, one decimal. Unlimited events report 0.
    pub fn tickets_sold_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        let ratio = f64::from(self.tickets_sold) / f64::from(self.capacity) * 100.0;
        (ratio * 10.0).round_ties_even() / 10.0
    }
}

/// "HH:MM" or "HH:MM:SS"
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}
