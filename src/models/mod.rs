//! Data models for the Events Portal
//!
//! Wire DTOs exchanged with the Events API live next to the domain types
//! they map into. View projections are in [`view`].

pub mod category;
pub mod event;
pub mod page;
pub mod ticket_category;
pub mod user;
pub mod view;

// Re-export commonly used types
pub use category::{Category, CategoryDto};
pub use event::{CreateEventDto, Event, EventDto, UpdateEventDto};
pub use page::{Listing, Page};
pub use ticket_category::{CreateTicketCategoryDto, TicketCategory, TicketCategoryDto};
pub use user::{Principal, Role};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept an identifier sent either as a JSON string or a number.
///
/// Anything else (null, objects, blanks) reads as absent instead of failing
/// the whole record.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Trimmed, non-empty string or `None`
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
