//! Catalog product models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_amount};
use crate::{Category, ProductId};

/// A catalog product as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in pesos.
    pub price: Decimal,
    /// Units in stock, never negative.
    pub stock: i32,
    pub category: Category,
    /// Club or national team the item belongs to.
    pub team: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
///
/// Updates replace every field, mirroring the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: Category,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl ProductInput {
    /// Check the constraints the `products` table enforces, so bad input is
    /// a 400 rather than a constraint violation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError("name is required".to_owned()));
        }
        check_amount("price", self.price)?;
        if self.stock < 0 {
            return Err(ValidationError("stock cannot be negative".to_owned()));
        }
        Ok(())
    }
}

/// Body of `POST /api/products/reduce-stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReduction {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: i32,
}
