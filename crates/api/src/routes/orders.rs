//! Order handlers.
//!
//! The buyer is taken from the bearer token when one is sent. Without a
//! token the id must be given explicitly (`user_id` in the body, or
//! `?user_id=` for the history). Order detail always needs a token.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use golazo_core::{CreateOrderRequest, Order, OrderId, OrderWithItems, Role, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Query string of `GET /api/orders/my-orders`.
#[derive(Debug, Deserialize)]
pub struct MyOrdersQuery {
    user_id: Option<UserId>,
}

fn resolve_user(auth: Option<&AuthUser>, explicit: Option<UserId>) -> Result<UserId> {
    auth.map(|user| user.id)
        .or(explicit)
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))
}

/// `POST /api/orders`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(request) = payload?;
    let user_id = resolve_user(auth.as_ref(), request.user_id)?;
    request.validate()?;

    let order = state.store().create_order(user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/my-orders[?user_id=]`
#[instrument(skip_all)]
pub async fn my_orders(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    query: std::result::Result<Query<MyOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let Query(query) = query?;
    let user_id = resolve_user(auth.as_ref(), query.user_id)?;
    let orders = state.store().orders_for_user(user_id).await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
///
/// Requires a token. Customers only see their own orders; admins see all.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderWithItems>> {
    let Path(id) = id?;
    let not_found = || AppError::NotFound("Order not found".to_string());

    let order = state.store().get_order(id).await?.ok_or_else(not_found)?;
    if user.role != Role::Admin && user.id != order.order.user_id {
        return Err(not_found());
    }
    Ok(Json(order))
}
