//! Product repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use golazo_core::{Category, Product, ProductId, ProductInput};

use super::{PgStore, ProductStore, RepositoryError, map_constraint_error};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, team, image_url, featured, created_at, updated_at";

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category: Category,
    team: String,
    image_url: Option<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category: row.category,
            team: row.team,
            image_url: row.image_url,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Build the catalog listing query, filtered by category when one is given.
fn list_query(category: Option<Category>) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    if let Some(category) = category {
        query.push(" WHERE category = ").push_bind(category);
    }
    query.push(" ORDER BY id");
    query
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = list_query(category)
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Product::from))
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, description, price, stock, category, team, image_url, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category)
        .bind(&input.team)
        .bind(&input.image_url)
        .bind(input.featured)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_constraint_error(e, "invalid product fields"))?;
        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, stock = $4, category = $5,
                team = $6, image_url = $7, featured = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category)
        .bind(&input.team)
        .bind(&input.image_url)
        .bind(input.featured)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_constraint_error(e, "invalid product fields"))?;
        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reduce_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET stock = stock - $1, updated_at = NOW()
            WHERE id = $2 AND stock >= $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(quantity)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Product::from))
    }
}
