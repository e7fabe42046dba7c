//! Cart validation models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;
use crate::ProductId;

/// One line of a cart submitted for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRequest {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Body of `POST /api/cart/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateCartRequest {
    pub items: Vec<CartLineRequest>,
}

/// A cart line checked against current stock and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedLine {
    pub product: Product,
    pub quantity: i32,
    /// Current unit price.
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// Response of `POST /api/cart/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedCart {
    pub items: Vec<ValidatedLine>,
    pub total: Decimal,
}
