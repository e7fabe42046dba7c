//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_amount};
use crate::{OrderId, OrderStatus, ProductId, UserId};

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Decimal,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One purchased line as shown in the order history.
///
/// `product_id` and `name` are `None` once the product has been removed
/// from the catalog; quantity and price are kept on the order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub quantity: i32,
    /// Unit price at time of purchase.
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// A cart line submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// The client sends its cart lines as-is, keyed by `id`.
    #[serde(rename = "id", alias = "product_id")]
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price the client displayed.
    pub price: Decimal,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Used when the request carries no bearer token.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItemInput>,
    pub total: Decimal,
    pub shipping_address: String,
}

impl CreateOrderRequest {
    /// Reject orders the `order_items` constraints would refuse.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty order, a non-positive quantity,
    /// or a price or total that is negative or too large to store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError("order has no items".to_owned()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(ValidationError(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
        for item in &self.items {
            check_amount("price", item.price)?;
        }
        check_amount("total", self.total)
    }
}
