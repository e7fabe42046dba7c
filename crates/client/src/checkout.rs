//! Checkout: place the order, then draw down stock line by line.
//!
//! The steps are separate requests. A failure stops the sequence and leaves
//! whatever already succeeded in place (the order row and any stock already
//! reduced); the cart is only cleared once every step has gone through.

use thiserror::Error;
use tracing::{info, instrument, warn};

use golazo_core::{CreateOrderRequest, Order, OrderId, ProductId, UserId};

use crate::api::{ApiClient, ClientError};
use crate::cart::CartStore;

/// Failures of [`checkout`], tagged with the step that failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("failed to create order: {0}")]
    CreateOrder(#[source] ClientError),

    /// The order exists but stock for `product_id` could not be reduced.
    #[error("order {order_id} created but stock reduction failed for product {product_id}: {source}")]
    ReduceStock {
        order_id: OrderId,
        product_id: ProductId,
        #[source]
        source: ClientError,
    },
}

/// Run the checkout sequence for the current cart.
///
/// 1. `POST /api/orders` with the cart lines, total and address
/// 2. `POST /api/products/reduce-stock` once per line, in cart order
/// 3. clear the cart
///
/// `user_id` is only needed when `client` has no token.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] without contacting the server when
/// there is nothing to buy, otherwise the first failing step.
#[instrument(skip(client, cart))]
pub async fn checkout(
    client: &ApiClient,
    cart: &CartStore,
    user_id: Option<UserId>,
    shipping_address: &str,
) -> Result<Order, CheckoutError> {
    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let request = CreateOrderRequest {
        user_id,
        items: snapshot.order_items(),
        total: snapshot.total,
        shipping_address: shipping_address.to_owned(),
    };
    let order = client
        .create_order(&request)
        .await
        .map_err(CheckoutError::CreateOrder)?;
    info!(order_id = %order.id, total = %order.total, "Order created");

    for item in &snapshot.items {
        if let Err(source) = client.reduce_stock(item.product_id, item.quantity).await {
            warn!(
                order_id = %order.id,
                product_id = %item.product_id,
                error = %source,
                "Stock reduction failed, aborting checkout"
            );
            return Err(CheckoutError::ReduceStock {
                order_id: order.id,
                product_id: item.product_id,
                source,
            });
        }
    }

    cart.clear();
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_any_request() {
        // Port 9 (discard) is never contacted: the empty check comes first.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let cart = CartStore::new();

        let err = checkout(&client, &cart, Some(UserId::new(1)), "Calle 1")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }
}
