//! Screen-shaped projections of the domain model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{category::Category, user::Principal};

/// Row of the event list screen
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventListItem {
    pub event_id: String,
    pub event_name: String,
    /// Category name, "Uncategorized" when the lookup misses
    pub event_category: String,
    pub description: String,
    pub location: String,
    pub venue_name: String,
    pub event_date: String,
    pub event_time: String,
    pub tickets_sold: u32,
    pub capacity: u32,
    pub tickets_sold_percentage: f64,
    pub ticket_categories: Vec<TicketCategoryView>,
}

/// Ticket category as displayed to buyers
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TicketCategoryView {
    pub ticket_id: String,
    pub ticket_category: String,
    pub price: Decimal,
    pub available_quantity: i32,
    pub description: String,
    pub formatted_price: String,
    pub availability_message: String,
    pub is_purchasable: bool,
}

impl TicketCategoryView {
    /// Buyer-facing wording; tighter "only N left" threshold than the domain message
    pub fn availability_message_for(available_quantity: i32) -> String {
        match available_quantity {
            0 => "Sold Out".to_string(),
            q if q < 0 => "Available".to_string(),
            q if q <= 5 => format!("Only {} left!", q),
            q => format!("{} available", q),
        }
    }
}

/// Event detail card
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventCard {
    pub event_id: String,
    pub event_name: String,
    pub description: String,
    pub event_category: String,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location: String,
    pub venue_name: String,
    pub status: String,
    pub capacity: u32,
    pub tickets_sold: u32,
    pub tickets_sold_percentage: f64,
    pub has_available_tickets: bool,
    pub is_upcoming: bool,
    pub days_until_event: i64,
    pub relative_time: String,
    pub ticket_categories: Vec<TicketCategoryView>,
}

impl EventCard {
    pub fn full_event_date_time(&self) -> Option<NaiveDateTime> {
        let date = self.event_date?;
        Some(date.and_time(self.event_time.unwrap_or(NaiveTime::MIN)))
    }

    pub fn is_upcoming_at(&self, now: NaiveDateTime) -> bool {
        self.full_event_date_time().is_some_and(|at| at > now)
    }

    /// Whole days until the event, never negative
    pub fn days_until_event_at(&self, now: NaiveDateTime) -> i64 {
        self.full_event_date_time()
            .map(|at| (at - now).num_days().max(0))
            .unwrap_or(0)
    }

    pub fn relative_time_description(days_until: i64) -> String {
        match days_until {
            i64::MIN..=0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            2..=6 => format!("In {} days", days_until),
            7..=13 => "Next week".to_string(),
            14..=29 => format!("In {} weeks", days_until / 7),
            _ => "More than a month away".to_string(),
        }
    }
}

/// Ticket category entered on the event form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TicketCategoryInput {
    pub ticket_id: Option<String>,
    pub ticket_category: String,
    pub price: Decimal,
    pub available_quantity: i32,
    pub description: String,
    pub max_per_customer: Option<u32>,
}

/// Create/edit event form
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct EventForm {
    pub event_id: Option<String>,
    #[validate(length(min = 1, code = "required", message = "Event name is required"))]
    pub event_name: String,
    #[validate(length(min = 1, code = "required", message = "Category is required"))]
    pub event_category: String,
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[validate(length(min = 1, code = "required", message = "Event date is required"))]
    pub event_date: String,
    /// HH:MM, midday when omitted
    pub event_time: Option<String>,
    #[validate(length(min = 1, code = "required", message = "Location is required"))]
    pub location: String,
    pub venue_name: Option<String>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub capacity: u32,
    pub status: Option<String>,
    pub ticket_categories: Vec<TicketCategoryInput>,
}

/// Event list screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventsPage {
    pub events: Vec<EventListItem>,
    pub categories: Vec<Category>,
    pub total: usize,
    /// Set when the list was rendered with degraded data
    pub warning: Option<String>,
}

/// Outcome of a create/update/delete action
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActionMessage {
    pub success: bool,
    pub message: String,
}

impl ActionMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error page content, read back from transient request data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPage {
    pub status_code: u16,
    /// Classified message stashed before the redirect, if any
    pub error_message: Option<String>,
    pub user_friendly_message: String,
    pub request_id: Option<String>,
}

impl ErrorPage {
    pub fn friendly_message(status_code: u16) -> &'static str {
        match status_code {
            400 => "There was a problem with your request. Please check your input and try again.",
            401 => "You need to log in to access this resource.",
            403 => "You don't have permission to access this resource.",
            404 => "The page you're looking for could not be found.",
            500 => "We're experiencing technical difficulties. Please try again later.",
            502 => "We're having trouble connecting to our services. Please try again later.",
            503 => "Our services are temporarily unavailable. Please try again later.",
            _ => "An unexpected error occurred. Please try again later.",
        }
    }
}

/// What the current caller may do
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountInfo {
    #[serde(flatten)]
    pub principal: Principal,
    pub can_create_events: bool,
    pub can_edit_events: bool,
    pub can_delete_events: bool,
}

impl From<Principal> for AccountInfo {
    fn from(principal: Principal) -> Self {
        let admin = principal.is_admin();
        Self {
            principal,
            can_create_events: admin,
            can_edit_events: admin,
            can_delete_events: admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(date: &str, time: &str) -> EventCard {
        EventCard {
            event_id: "evt-1".to_string(),
            event_name: "Jazz Night".to_string(),
            description: String::new(),
            event_category: String::new(),
            event_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            event_time: NaiveTime::parse_from_str(time, "%H:%M").ok(),
            location: String::new(),
            venue_name: String::new(),
            status: "Published".to_string(),
            capacity: 0,
            tickets_sold: 0,
            tickets_sold_percentage: 0.0,
            has_available_tickets: true,
            is_upcoming: false,
            days_until_event: 0,
            relative_time: String::new(),
            ticket_categories: Vec::new(),
        }
    }

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_days_until_event() {
        let c = card("2025-03-20", "19:00");
        assert_eq!(c.days_until_event_at(at("2025-03-01 10:00")), 19);
        assert!(c.is_upcoming_at(at("2025-03-20 18:59")));
        assert!(!c.is_upcoming_at(at("2025-03-21 09:00")));
        assert_eq!(c.days_until_event_at(at("2025-04-01 10:00")), 0);
    }

    #[test]
    fn test_relative_time_description() {
        assert_eq!(EventCard::relative_time_description(0), "Today");
        assert_eq!(EventCard::relative_time_description(1), "Tomorrow");
        assert_eq!(EventCard::relative_time_description(4), "In 4 days");
        assert_eq!(EventCard::relative_time_description(9), "Next week");
        assert_eq!(EventCard::relative_time_description(21), "In 3 weeks");
        assert_eq!(EventCard::relative_time_description(45), "More than a month away");
    }

    #[test]
    fn test_buyer_availability_wording() {
        assert_eq!(TicketCategoryView::availability_message_for(0), "Sold Out");
        assert_eq!(TicketCategoryView::availability_message_for(5), "Only 5 left!");
        assert_eq!(TicketCategoryView::availability_message_for(6), "6 available");
        assert_eq!(TicketCategoryView::availability_message_for(-1), "Available");
    }

    #[test]
    fn test_friendly_error_messages() {
        assert_eq!(
            ErrorPage::friendly_message(401),
            "You need to log in to access this resource."
        );
        assert_eq!(
            ErrorPage::friendly_message(418),
            "An unexpected error occurred. Please try again later."
        );
    }

    #[test]
    fn test_form_requires_fields() {
        let form = EventForm {
            event_name: "Jazz Night".to_string(),
            ..EventForm::default()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("location"));
        assert!(fields.contains_key("event_date"));
        assert!(!fields.contains_key("event_name"));
    }
}
