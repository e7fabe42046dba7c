//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (database)
//! GET  /api/test                     - Database round-trip
//!
//! # Auth (rate limited)
//! POST /api/auth/register            - Create an account
//! POST /api/auth/login               - Exchange credentials for a token
//!
//! # Products
//! GET  /api/products[?category=]     - Catalog listing
//! GET  /api/products/{id}            - Product detail
//! POST /api/products                 - Create product
//! PUT  /api/products/{id}            - Replace product fields
//! DELETE /api/products/{id}          - Delete product
//! POST /api/products/reduce-stock    - Decrement stock after checkout
//!
//! # Cart (requires token)
//! POST /api/cart/validate            - Re-price and stock-check a cart
//!
//! # Orders
//! POST /api/orders                   - Place an order
//! GET  /api/orders/my-orders         - Order history
//! GET  /api/orders/{id}              - Order detail
//!
//! # Uploads
//! POST /api/upload/image             - Upload a product image
//! GET  /uploads/{file}               - Uploaded files
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/reduce-stock", post(products::reduce_stock))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/validate", post(cart::validate))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/my-orders", get(orders::my_orders))
        .route("/{id}", get(orders::show))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/image", post(upload::upload_image))
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
}

/// Build the complete application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let mut auth = auth_routes();
    if state.config().rate_limit {
        auth = auth.layer(auth_rate_limiter());
    }

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/test", get(health::db_test))
        .nest("/api/auth", auth)
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/upload", upload_routes())
        .nest_service("/uploads", ServeDir::new(&state.config().upload_dir))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
