//! Cart validation against current stock and prices.

use rust_decimal::Decimal;
use thiserror::Error;

use golazo_core::{CartLineRequest, ProductId, ValidatedCart, ValidatedLine};

use crate::db::{ProductStore, RepositoryError};

/// Reasons a cart cannot be checked out as submitted.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStock { name: String, available: i32 },

    #[error("Quantity for product {0} must be positive")]
    InvalidQuantity(ProductId),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Price every line at the current catalog price and check stock.
///
/// Lines are checked in order and the first failure is returned. Nothing is
/// reserved: stock may change before the order is placed.
///
/// # Errors
///
/// Returns `CartError` for a non-positive quantity, a missing product, or a
/// line asking for more than is in stock.
pub async fn validate_cart<S: ProductStore + ?Sized>(
    products: &S,
    lines: &[CartLineRequest],
) -> Result<ValidatedCart, CartError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;

    for line in lines {
        if line.quantity <= 0 {
            return Err(CartError::InvalidQuantity(line.product_id));
        }

        let product = products
            .get_product(line.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(line.product_id))?;

        if product.stock < line.quantity {
            return Err(CartError::InsufficientStock {
                name: product.name,
                available: product.stock,
            });
        }

        let price = product.price;
        let subtotal = price * Decimal::from(line.quantity);
        total += subtotal;
        items.push(ValidatedLine {
            product,
            quantity: line.quantity,
            price,
            subtotal,
        });
    }

    Ok(ValidatedCart { items, total })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use golazo_core::{Category, ProductInput};

    use crate::db::MemoryStore;

    fn input(name: &str, price: i64, stock: i32) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: String::new(),
            price: Decimal::from(price),
            stock,
            category: Category::Accesorios,
            team: "Millonarios".to_owned(),
            image_url: None,
            featured: false,
        }
    }

    fn line(product_id: ProductId, quantity: i32) -> CartLineRequest {
        CartLineRequest {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_totals_use_current_prices() {
        let store = MemoryStore::new();
        let bufanda = store.insert_product(input("Bufanda", 45_000, 10)).await;
        let gorra = store.insert_product(input("Gorra", 60_000, 3)).await;

        let cart = validate_cart(&store, &[line(bufanda.id, 2), line(gorra.id, 3)])
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].subtotal, Decimal::from(90_000));
        assert_eq!(cart.items[1].subtotal, Decimal::from(180_000));
        assert_eq!(cart.total, Decimal::from(270_000));
    }

    #[tokio::test]
    async fn test_empty_cart_totals_zero() {
        let store = MemoryStore::new();
        let cart = validate_cart(&store, &[]).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_insufficient_stock_names_product() {
        let store = MemoryStore::new();
        let gorra = store.insert_product(input("Gorra", 60_000, 3)).await;

        let err = validate_cart(&store, &[line(gorra.id, 4)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock for Gorra. Available: 3");
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let store = MemoryStore::new();
        let gorra = store.insert_product(input("Gorra", 60_000, 3)).await;

        let err = validate_cart(
            &store,
            &[line(ProductId::new(404), 1), line(gorra.id, 10)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(id) if id == ProductId::new(404)));
        assert_eq!(err.to_string(), "Product 404 not found");
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let store = MemoryStore::new();
        let gorra = store.insert_product(input("Gorra", 60_000, 3)).await;
        let err = validate_cart(&store, &[line(gorra.id, 0)]).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));
    }
}
