//! Events service: upstream calls plus mapping, with soft failure everywhere

use serde_json::Value;

use crate::{
    models::{view::EventsPage, Category, CategoryDto, Event},
    upstream::{Lookup, UpstreamClient, UpstreamError},
};

use super::mapping::{self, MappingError};

const EVENTS_PATH: &str = "api/events";
const CATEGORIES_PATH: &str = "api/categories";
const LEGACY_CATEGORIES_PATH: &str = "api/categoryentity";

/// Result of a create/update call
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Saved,
    /// Rejected locally; nothing was sent upstream
    Rejected(MappingError),
    /// Sent, but the upstream did not accept it
    Failed,
}

#[derive(Clone)]
pub struct EventsService {
    client: UpstreamClient,
}

impl EventsService {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Path of a single event. Ids that would escape the collection are refused.
    fn event_path(id: &str) -> Result<String, UpstreamError> {
        let id = id.trim();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(format!("{EVENTS_PATH}/{id}"))
        } else {
            Err(UpstreamError::InvalidPath {
                path: format!("{EVENTS_PATH}/{id}"),
                message: "event ID contains unsupported characters".to_string(),
            })
        }
    }

    pub async fn get_all_events(&self) -> Vec<Event> {
        self.client
            .fetch_all::<Value>(EVENTS_PATH)
            .await
            .iter()
            .map(mapping::event_from_value)
            .collect()
    }

    pub async fn get_event_by_id(&self, id: &str) -> Lookup<Event> {
        let path = match Self::event_path(id) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}", e);
                return Lookup::Failed(e);
            }
        };

        self.client
            .fetch_one::<Value>(&path)
            .await
            .map(|value| mapping::event_from_value(&value))
    }

    pub async fn create_event(&self, event: &Event) -> WriteOutcome {
        let body = match mapping::build_create_event(event) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Event '{}' rejected before create: {}", event.event_name, e);
                return WriteOutcome::Rejected(e);
            }
        };

        if self.client.create(EVENTS_PATH, &body).await {
            WriteOutcome::Saved
        } else {
            WriteOutcome::Failed
        }
    }

    pub async fn update_event(&self, event: &Event) -> WriteOutcome {
        let body = match mapping::build_update_event(event) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Event '{}' rejected before update: {}", event.event_id, e);
                return WriteOutcome::Rejected(e);
            }
        };

        let path = match Self::event_path(&event.event_id) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}", e);
                return WriteOutcome::Rejected(MappingError::MissingField("Event ID"));
            }
        };

        if self.client.update(&path, &body).await {
            WriteOutcome::Saved
        } else {
            WriteOutcome::Failed
        }
    }

    pub async fn delete_event(&self, id: &str) -> bool {
        match Self::event_path(id) {
            Ok(path) => self.client.delete(&path).await,
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        }
    }

    /// Categories, falling back to the legacy entity endpoint. Invalid entries are dropped.
    pub async fn get_all_categories(&self) -> Vec<Category> {
        let mut dtos = self.client.fetch_all::<CategoryDto>(CATEGORIES_PATH).await;
        if dtos.is_empty() {
            tracing::info!("No categories from {}, trying {}", CATEGORIES_PATH, LEGACY_CATEGORIES_PATH);
            dtos = self
                .client
                .fetch_all::<CategoryDto>(LEGACY_CATEGORIES_PATH)
                .await;
        }

        let total = dtos.len();
        let categories: Vec<Category> = dtos
            .iter()
            .filter(|dto| dto.is_valid())
            .map(|dto| mapping::map_to_category(Some(dto)))
            .collect();

        if categories.len() < total {
            tracing::warn!(
                "Skipped {} invalid categories",
                total - categories.len()
            );
        }
        categories
    }

    pub async fn is_api_healthy(&self) -> bool {
        self.client.health_check().await
    }

    /// Event list screen: categories first, then events, then the join
    pub async fn events_page(&self) -> EventsPage {
        let categories = self.get_all_categories().await;
        let events = self.get_all_events().await;

        let warning = categories.is_empty().then(|| {
            tracing::warn!("Rendering events without categories");
            "Categories could not be loaded. Events will be shown without category information."
                .to_string()
        });

        let items = mapping::to_list_items(&events, &categories);
        tracing::info!("Prepared events page with {} events", items.len());

        EventsPage {
            total: items.len(),
            events: items,
            categories,
            warning,
        }
    }
}
