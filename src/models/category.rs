//! Event category model

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use utoipa::ToSchema;

/// Category as the Events API sends it
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryDto {
    #[serde(deserialize_with = "super::lenient_id")]
    pub id: Option<String>,
    /// Legacy entity endpoint spelling of `id`
    #[serde(deserialize_with = "super::lenient_id")]
    pub category_id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub description: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub color_code: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub color: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub event_count: i64,
}

impl CategoryDto {
    /// `id`, then `categoryId`
    pub fn resolved_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.category_id.as_deref())
    }

    /// `colorCode`, then `color`
    pub fn resolved_color(&self) -> Option<&str> {
        self.color_code.as_deref().or(self.color.as_deref())
    }

    /// Usable as a lookup entry: a positive numeric id (or opaque non-empty id) and a name
    pub fn is_valid(&self) -> bool {
        let id_ok = self
            .resolved_id()
            .is_some_and(|id| id.parse::<i64>().map_or(!id.is_empty(), |n| n > 0));
        let name_ok = self
            .name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        id_ok && name_ok
    }
}

/// Event category (domain)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            category_id: String::new(),
            name: String::new(),
            description: None,
            color: None,
            is_active: true,
        }
    }
}

impl Category {
    pub fn can_create_events(&self) -> bool {
        self.is_active && !self.name.trim().is_empty()
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.category_id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_validity() {
        let dto = CategoryDto {
            id: Some("3".to_string()),
            name: Some("Concerts".to_string()),
            ..CategoryDto::default()
        };
        assert!(dto.is_valid());

        let zero = CategoryDto {
            id: Some("0".to_string()),
            ..dto.clone()
        };
        assert!(!zero.is_valid());

        let unnamed = CategoryDto {
            name: None,
            ..dto
        };
        assert!(!unnamed.is_valid());
    }

    #[test]
    fn test_legacy_id_spelling() {
        let legacy = CategoryDto {
            category_id: Some("5".to_string()),
            name: Some("Sports".to_string()),
            color: Some("#00ff00".to_string()),
            ..CategoryDto::default()
        };
        assert!(legacy.is_valid());
        assert_eq!(legacy.resolved_id(), Some("5"));
        assert_eq!(legacy.resolved_color(), Some("#00ff00"));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let category = Category {
            category_id: "7".to_string(),
            ..Category::default()
        };
        assert_eq!(category.display_name(), "7");
        assert!(!category.can_create_events());
    }
}
