//! Order repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use golazo_core::{
    CreateOrderRequest, Order, OrderId, OrderLine, OrderStatus, OrderWithItems, UserId,
};

use super::{OrderStore, PgStore, RepositoryError, map_reference_error};

const ORDER_COLUMNS: &str = "id, user_id, total, shipping_address, status, created_at";

/// Orders joined with their lines, aggregated into a JSON array per order.
///
/// Prices are cast to text so they keep their exact decimal value.
const ORDER_WITH_ITEMS_SELECT: &str = r"
    SELECT o.id, o.user_id, o.total, o.shipping_address, o.status, o.created_at,
           COALESCE(
               json_agg(
                   json_build_object(
                       'product_id', oi.product_id,
                       'name', p.name,
                       'quantity', oi.quantity,
                       'price', oi.price::text,
                       'image_url', p.image_url
                   ) ORDER BY oi.id
               ) FILTER (WHERE oi.id IS NOT NULL),
               '[]'::json
           ) AS items
    FROM orders o
    LEFT JOIN order_items oi ON oi.order_id = o.id
    LEFT JOIN products p ON p.id = oi.product_id
";

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total: Decimal,
    shipping_address: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total: row.total,
            shipping_address: row.shipping_address,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderWithItemsRow {
    #[sqlx(flatten)]
    order: OrderRow,
    items: Json<Vec<OrderLine>>,
}

impl From<OrderWithItemsRow> for OrderWithItems {
    fn from(row: OrderWithItemsRow) -> Self {
        Self {
            order: row.order.into(),
            items: row.items.0,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(
        &self,
        user_id: UserId,
        request: &CreateOrderRequest,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let order = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (user_id, total, shipping_address, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(request.total)
        .bind(&request.shipping_address)
        .bind(OrderStatus::Confirmed)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_reference_error(e, &format!("user {user_id} does not exist"), "invalid order")
        })?;

        for item in &request.items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_reference_error(
                    e,
                    &format!("product {} does not exist", item.product_id),
                    "invalid order item",
                )
            })?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            items = request.items.len(),
            "Order created"
        );

        Ok(order.into())
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithItemsRow>(&format!(
            "{ORDER_WITH_ITEMS_SELECT} WHERE o.user_id = $1 GROUP BY o.id ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(OrderWithItems::from).collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderWithItemsRow>(&format!(
            "{ORDER_WITH_ITEMS_SELECT} WHERE o.id = $1 GROUP BY o.id"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(OrderWithItems::from))
    }
}
