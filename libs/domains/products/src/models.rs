use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{ProductError, ProductResult};

/// Category, embedded by value in every product that references it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Category {
    /// Identifier assigned by the store on first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Identifier assigned by the store on first save, immutable afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Unit price, always positive
    #[schema(example = 250.0)]
    pub price: f64,
    pub category: Category,
    /// Set once on first persistence
    pub created_at: DateTime<Utc>,
    /// Stored filename of the uploaded image
    #[serde(default)]
    pub picture: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            category,
            created_at: Utc::now(),
            picture: None,
        }
    }

    /// Copy name, price and category from `payload`.
    ///
    /// Identifier, creation time and picture are left untouched whatever the
    /// payload carries.
    pub fn overlay(&mut self, payload: ProductPayload) -> ProductResult<()> {
        self.name = required(payload.name, "name")?;
        self.price = required(payload.price, "price")?;
        self.category = required(payload.category, "category")?;
        Ok(())
    }
}

/// Inbound product body for create and update.
///
/// Every field is optional on the wire so a single validation pass can report
/// all missing ones together. `id` and `picture` are never accepted.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(
        required(message = "must not be empty"),
        length(min = 1, message = "must not be empty")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "must not be null"),
        range(exclusive_min = 0.0, message = "must be greater than 0"),
        custom(function = "finite_price", message = "must be a number")
    )]
    pub price: Option<f64>,

    #[validate(required(message = "must not be null"), nested)]
    pub category: Option<Category>,

    /// Kept when present, otherwise stamped at first persistence
    #[serde(default, alias = "createAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductPayload {
    /// Build an unsaved product, stamping `created_at` with `now` when absent.
    pub fn into_product(self, now: DateTime<Utc>) -> ProductResult<Product> {
        Ok(Product {
            id: None,
            name: required(self.name, "name")?,
            price: required(self.price, "price")?,
            category: required(self.category, "category")?,
            created_at: self.created_at.unwrap_or(now),
            picture: None,
        })
    }
}

/// Inbound category body
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(
        required(message = "must not be empty"),
        length(min = 1, message = "must not be empty")
    )]
    pub name: Option<String>,
}

fn finite_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

fn required<T>(value: Option<T>, field: &str) -> ProductResult<T> {
    value.ok_or_else(|| ProductError::BadRequest(format!("missing field '{}'", field)))
}
