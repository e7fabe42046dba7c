//! Golazo Client - consumer side of the storefront API.
//!
//! # Modules
//!
//! - [`api`] - Typed `reqwest` client for every endpoint
//! - [`cart`] - Client-held cart with an observable snapshot and total
//! - [`checkout`] - Order placement followed by per-line stock reduction
//!
//! # Example
//!
//! ```rust,ignore
//! use golazo_client::{ApiClient, CartItem, CartStore, checkout};
//!
//! let client = ApiClient::new("http://localhost:3000")?;
//! let auth = client.login("hincha@golazo.co", "camiseta10").await?;
//! let client = client.with_token(auth.token);
//!
//! let cart = CartStore::new();
//! let product = client.product(ProductId::new(1)).await?;
//! cart.add(CartItem::from_product(&product, 2));
//!
//! let order = checkout(&client, &cart, None, "Calle 26 #59-51, Bogotá").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;

pub use api::{ApiClient, ClientError};
pub use cart::{Cart, CartItem, CartStore};
pub use checkout::{CheckoutError, checkout};
