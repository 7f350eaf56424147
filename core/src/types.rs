//! Domain DTOs for the fridge API.
//!
//! # Design
//! These types mirror the backend's schema but are defined independently;
//! integration tests against the mock server catch drift. `ProductDraft`
//! carries the structural checks that must pass before any network call,
//! and `FilterConfig` knows how to encode itself as a query string.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Longest product name the backend stores.
const MAX_NAME_LEN: usize = 190;

/// A product in the fridge, as returned by the API.
///
/// The authoritative copy lives server-side; values held by
/// [`InventoryController`](crate::InventoryController) are a cached replica
/// refreshed only from successful responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
}

/// Payload for creating or replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub quantity: i64,
}

impl ProductDraft {
    /// Structural checks performed before any network call.
    pub fn validate(&self) -> Result<(), ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "product name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ApiError::Validation(format!(
                "product name longer than {MAX_NAME_LEN} characters"
            )));
        }
        if self.quantity < 0 {
            return Err(ApiError::Validation(
                "quantity must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Field the server sorts listings by. Always ascending; ties keep the
/// server's insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    ExpiryDate,
    Name,
    Category,
    Quantity,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::ExpiryDate => "expiry_date",
            SortField::Name => "name",
            SortField::Category => "category",
            SortField::Quantity => "quantity",
        }
    }
}

/// Active listing filter.
///
/// Replaced wholesale by
/// [`InventoryController::apply_filters`](crate::InventoryController::apply_filters);
/// never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exact category to list, `None` for all.
    pub category: Option<String>,
    /// Case-insensitive substring match on the product name.
    pub search: String,
    pub sort_by: SortField,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category: None,
            search: String::new(),
            sort_by: SortField::ExpiryDate,
        }
    }
}

impl FilterConfig {
    /// Encode as a URL query string. Unset fields are omitted; the sort
    /// field is always sent so the listing contract stays explicit.
    pub fn to_query(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if let Some(category) = &self.category {
            params.push(format!("category={}", urlencoding::encode(category)));
        }
        if !self.search.is_empty() {
            params.push(format!("search={}", urlencoding::encode(&self.search)));
        }
        params.push(format!("sort_by={}", self.sort_by.as_str()));
        params.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, quantity: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: None,
            expiry_date: None,
            quantity,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft("Milk", 2).validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = draft("", 1).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let err = draft("   ", 1).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let err = draft(&"x".repeat(191), 1).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn name_at_limit_passes() {
        assert!(draft(&"x".repeat(190), 1).validate().is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = draft("Milk", -1).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn zero_quantity_passes() {
        assert!(draft("Milk", 0).validate().is_ok());
    }

    #[test]
    fn draft_quantity_defaults_to_zero() {
        let input: ProductDraft = serde_json::from_str(r#"{"name":"Eggs"}"#).unwrap();
        assert_eq!(input.quantity, 0);
        assert!(input.category.is_none());
        assert!(input.expiry_date.is_none());
    }

    #[test]
    fn product_roundtrips_through_json() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Yoghurt".to_string(),
            category: Some("dairy".to_string()),
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            quantity: 3,
        };
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn expiry_date_serializes_as_iso_date() {
        let product = Product {
            id: Uuid::nil(),
            name: "Butter".to_string(),
            category: None,
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            quantity: 1,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["expiry_date"], "2024-01-01");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn default_filter_encodes_only_sort() {
        assert_eq!(FilterConfig::default().to_query(), "sort_by=expiry_date");
    }

    #[test]
    fn full_filter_encodes_all_fields() {
        let filter = FilterConfig {
            category: Some("dairy".to_string()),
            search: "milk".to_string(),
            sort_by: SortField::Name,
        };
        assert_eq!(filter.to_query(), "category=dairy&search=milk&sort_by=name");
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let filter = FilterConfig {
            category: Some("ready meals".to_string()),
            search: "50% off".to_string(),
            sort_by: SortField::ExpiryDate,
        };
        assert_eq!(
            filter.to_query(),
            "category=ready%20meals&search=50%25%20off&sort_by=expiry_date"
        );
    }

    #[test]
    fn sort_field_deserializes_from_snake_case() {
        let field: SortField = serde_json::from_str(r#""expiry_date""#).unwrap();
        assert_eq!(field, SortField::ExpiryDate);
    }
}
