//! Ticket category model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use utoipa::ToSchema;

/// Ticket category as the Events API sends it
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketCategoryDto {
    #[serde(deserialize_with = "super::lenient_id")]
    pub ticket_id: Option<String>,
    #[serde(deserialize_with = "super::lenient_id")]
    pub id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub ticket_category: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub category: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub price: Decimal,
    #[serde_as(as = "DefaultOnError")]
    pub available_quantity: i64,
    #[serde_as(as = "DefaultOnError")]
    pub description: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub max_per_customer: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    pub sale_start_date: Option<DateTime<Utc>>,
    #[serde_as(as = "DefaultOnError")]
    pub sale_end_date: Option<DateTime<Utc>>,
}

impl TicketCategoryDto {
    /// `ticketId`, `id`
    pub fn resolved_id(&self) -> Option<&str> {
        self.ticket_id.as_deref().or(self.id.as_deref())
    }

    /// `ticketCategory`, `category`, `name`
    pub fn resolved_label(&self) -> Option<&str> {
        [&self.ticket_category, &self.category, &self.name]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.trim().is_empty()))
    }

    pub fn is_purchasable(&self) -> bool {
        self.resolved_label().is_some()
            && self.available_quantity != 0
            && self.price >= Decimal::ZERO
    }

    /// Price as the API expects it in query strings ("12.50")
    pub fn api_formatted_price(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// Ticket category sent along with a new event
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketCategoryDto {
    pub ticket_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub available_quantity: i32,
    pub description: String,
}

/// Ticket category (domain)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TicketCategory {
    pub ticket_id: String,
    /// Category label ("General", "VIP", ...)
    pub category: String,
    pub price: Decimal,
    /// Negative means unlimited
    pub available_quantity: i32,
    pub description: String,
    pub max_per_customer: Option<u32>,
    pub is_available: bool,
    pub sale_start_date: Option<DateTime<Utc>>,
    pub sale_end_date: Option<DateTime<Utc>>,
}

impl Default for TicketCategory {
    fn default() -> Self {
        Self {
            ticket_id: uuid::Uuid::new_v4().to_string(),
            category: String::new(),
            price: Decimal::ZERO,
            available_quantity: 0,
            description: String::new(),
            max_per_customer: None,
            is_available: true,
            sale_start_date: None,
            sale_end_date: None,
        }
    }
}

impl TicketCategory {
    /// On sale at `now`: flagged available, not sold out, inside the sale window
    pub fn is_currently_available_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_available || self.available_quantity == 0 {
            return false;
        }
        if self.sale_start_date.is_some_and(|start| now < start) {
            return false;
        }
        if self.sale_end_date.is_some_and(|end| now > end) {
            return false;
        }
        true
    }

    pub fn is_currently_available(&self) -> bool {
        self.is_currently_available_at(Utc::now())
    }

    pub fn is_limited_quantity(&self) -> bool {
        self.available_quantity > 0
    }

    pub fn formatted_price(&self) -> String {
        if self.price.is_zero() {
            "Free".to_string()
        } else {
            format!("${:.2}", self.price)
        }
    }

    pub fn availability_message_at(&self, now: DateTime<Utc>) -> String {
        if !self.is_currently_available_at(now) {
            if self.available_quantity == 0 {
                return "Sold Out".to_string();
            }
            if let Some(start) = self.sale_start_date.filter(|start| now < *start) {
                return format!("Sale starts {}", start.format("%b %d, %Y"));
            }
            if self.sale_end_date.is_some_and(|end| now > end) {
                return "Sale ended".to_string();
            }
            return "Not available".to_string();
        }

        match self.available_quantity {
            q if q < 0 => "Available".to_string(),
            q if q <= 10 => format!("Only {} left!", q),
            q => format!("{} available", q),
        }
    }

    pub fn availability_message(&self) -> String {
        self.availability_message_at(Utc::now())
    }

    /// Whether one customer may buy `quantity` tickets at `now`
    pub fn can_purchase_at(&self, quantity: u32, now: DateTime<Utc>) -> bool {
        if !self.is_currently_available_at(now) || quantity == 0 {
            return false;
        }
        if self.is_limited_quantity() && i64::from(quantity) > i64::from(self.available_quantity) {
            return false;
        }
        if self.max_per_customer.is_some_and(|cap| quantity > cap) {
            return false;
        }
        true
    }

    pub fn can_purchase(&self, quantity: u32) -> bool {
        self.can_purchase_at(quantity, Utc::now())
    }
}
