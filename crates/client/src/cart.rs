//! Client-held shopping cart.
//!
//! The cart is never persisted server side. [`CartStore`] keeps the current
//! [`Cart`] in a `tokio::sync::watch` channel so views can subscribe and see
//! every snapshot; the total is recomputed on each mutation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use golazo_core::{CartLineRequest, OrderItemInput, Product, ProductId};

/// A product line in the cart, priced when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Line for `quantity` units of `product` at its current price.
    #[must_use]
    pub fn from_product(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        }
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Snapshot of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Lines in the shape `POST /api/orders` expects.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItemInput> {
        self.items
            .iter()
            .map(|item| OrderItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    }

    /// Lines in the shape `POST /api/cart/validate` expects.
    #[must_use]
    pub fn validation_lines(&self) -> Vec<CartLineRequest> {
        self.items
            .iter()
            .map(|item| CartLineRequest {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(CartItem::subtotal).sum();
    }
}

/// Observable cart.
#[derive(Debug)]
pub struct CartStore {
    tx: watch::Sender<Cart>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Cart::default());
        Self { tx }
    }

    /// Receiver that sees every cart snapshot from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.tx.borrow().total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Add a line. Adding a product already in the cart increases that
    /// line's quantity and keeps its original price.
    pub fn add(&self, item: CartItem) {
        self.mutate(|cart| {
            match cart
                .items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                Some(line) => line.quantity += item.quantity,
                None => cart.items.push(item),
            }
        });
    }

    /// Set a line's quantity. Zero or less removes the line; unknown
    /// products are ignored.
    pub fn update_quantity(&self, product_id: ProductId, quantity: i32) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        self.mutate(|cart| {
            if let Some(line) = cart
                .items
                .iter_mut()
                .find(|line| line.product_id == product_id)
            {
                line.quantity = quantity;
            }
        });
    }

    pub fn remove(&self, product_id: ProductId) {
        self.mutate(|cart| cart.items.retain(|line| line.product_id != product_id));
    }

    pub fn clear(&self) {
        self.tx.send_replace(Cart::default());
    }

    fn mutate(&self, f: impl FnOnce(&mut Cart)) {
        self.tx.send_modify(|cart| {
            f(cart);
            cart.recompute_total();
        });
    }
}
