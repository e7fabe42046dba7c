//! Product catalog handlers.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use golazo_core::{Category, MessageResponse, Product, ProductId, ProductInput, StockReduction};

use crate::error::{AppError, Result};
use crate::state::AppState;

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Query string of `GET /api/products`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
}

impl ListQuery {
    /// An empty `?category=` means no filter.
    fn category(&self) -> Result<Option<Category>> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: golazo_core::ParseEnumError| AppError::BadRequest(e.to_string())),
        }
    }
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// `GET /api/products[?category=]`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>> {
    let Query(query) = query?;
    let products = state.store().list_products(query.category()?).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let product = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(Json(product))
}

/// `POST /api/products`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(input) = payload?;
    input.validate()?;
    let product = state.store().create_product(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    payload: JsonBody<ProductInput>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    input.validate()?;
    let product = state
        .store()
        .update_product(id, &input)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    if !state.store().delete_product(id).await? {
        return Err(product_not_found());
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted")))
}

/// `POST /api/products/reduce-stock`
///
/// A single conditional UPDATE; stock never drops below zero.
#[instrument(skip_all)]
pub async fn reduce_stock(
    State(state): State<AppState>,
    payload: JsonBody<StockReduction>,
) -> Result<Json<Product>> {
    let Json(reduction) = payload?;
    if reduction.quantity <= 0 {
        return Err(AppError::BadRequest(
            "Quantity must be positive".to_string(),
        ));
    }

    let product = state
        .store()
        .reduce_stock(reduction.product_id, reduction.quantity)
        .await?
        .ok_or_else(|| AppError::BadRequest("Insufficient stock".to_string()))?;

    tracing::info!(
        product_id = %product.id,
        quantity = reduction.quantity,
        remaining = product.stock,
        "Stock reduced"
    );
    Ok(Json(product))
}
