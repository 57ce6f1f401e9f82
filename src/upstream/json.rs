//! Case-insensitive JSON decoding for upstream payloads.
//!
//! Object keys are compared with case and separators ignored, so `eventName`,
//! `EventName`, `EVENTNAME`, `eventname` and `event_name` all land on the same
//! field. Multi-word keys are restored to their snake_case field name from
//! [`FIELD_NAMES`]; other keys are kept lowercased.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Multi-word field names used by the Events API payloads
const FIELD_NAMES: &[&str] = &[
    // events
    "event_id",
    "event_name",
    "event_category",
    "category_id",
    "owner_id",
    "owner_name",
    "owner_email",
    "venue_name",
    "event_date",
    "event_time",
    "event_date_time",
    "tickets_sold",
    "ticket_categories",
    // ticket categories
    "ticket_id",
    "ticket_category",
    "available_quantity",
    "max_per_customer",
    "sale_start_date",
    "sale_end_date",
    // categories
    "color_code",
    "event_count",
    // paged envelope
    "total_count",
    "page_size",
    "current_page",
    "total_pages",
    "has_previous",
    "has_next",
];

/// Key with case and `_`/`-` separators dropped: `Event_ID` -> `eventid`
fn compact(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fold one key onto its field name: `EventID`, `eventid` -> `event_id`
pub fn fold_key(key: &str) -> String {
    let compacted = compact(key);
    FIELD_NAMES
        .iter()
        .find(|name| name.chars().filter(|c| *c != '_').eq(compacted.chars()))
        .map_or(compacted, |name| (*name).to_string())
}

/// Fold every object key, recursively. When two keys fold onto the same
/// field only the first one seen is kept.
pub fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::with_capacity(map.len());
            for (key, value) in map {
                let key = fold_key(&key);
                if folded.contains_key(&key) {
                    tracing::debug!("Ignoring duplicate upstream key '{}'", key);
                    continue;
                }
                folded.insert(key, fold_keys(value));
            }
            Value::Object(folded)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_value(value)
}

pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(fold_keys(value))
}
