//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Camiseta Local
//!     price: "350000"
//!     stock: 25
//!     category: camisetas
//!     team: Selección Colombia
//!     featured: true
//! ```
//!
//! `description`, `team`, `image_url` and `featured` are optional.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use golazo_api::db::{PgStore, ProductStore};
use golazo_core::ProductInput;

/// Top level of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductInput>,
}

/// Parse a seed file and check every product, returning all problems
/// found rather than only the first.
pub fn parse(content: &str) -> Result<Vec<ProductInput>, Box<dyn std::error::Error>> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let errors: Vec<String> = file
        .products
        .iter()
        .enumerate()
        .filter_map(|(i, product)| {
            product
                .validate()
                .err()
                .map(|e| format!("product #{} ({}): {e}", i + 1, product.name))
        })
        .collect();

    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(file.products)
}

/// Insert the products listed in `file_path`.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `clear_existing` - If true, delete every existing product first
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn products(file_path: &Path, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    info!(path = %file_path.display(), "Loading products from file");

    // Read and validate before touching the database
    let content = tokio::fs::read_to_string(file_path).await?;
    let products = parse(&content)?;
    info!(products = products.len(), "Seed file validated");

    let pool = super::connect().await?;

    if clear_existing {
        let deleted = sqlx::query("DELETE FROM products")
            .execute(&pool)
            .await?
            .rows_affected();
        info!(deleted, "Cleared existing products");
    }

    let store = PgStore::new(pool);
    for input in &products {
        let product = store.create_product(input).await?;
        info!(id = %product.id, name = %product.name, "Inserted product");
    }

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use golazo_core::Category;
    use rust_decimal::Decimal;

    #[test]
    fn test_bundled_catalog_parses() {
        let products = parse(include_str!("../../data/products.yaml")).unwrap();
        assert_eq!(products.len(), 8);
        assert!(
            Category::ALL
                .iter()
                .all(|c| products.iter().any(|p| p.category == *c))
        );
        assert_eq!(products[0].price, Decimal::from(350_000));
        assert!(products[0].featured);
        assert_eq!(products[0].team, "Selección Colombia");
        assert!(products[3].description.is_empty());
    }

    #[test]
    fn test_numeric_prices_accepted() {
        let products = parse(
            "products:\n  - name: Gorra\n    price: 39900\n    stock: 3\n    category: souvenirs\n",
        )
        .unwrap();
        assert_eq!(products[0].price, Decimal::from(39_900));
    }

    #[test]
    fn test_invalid_products_rejected() {
        let err = parse(
            "products:\n  - name: ' '\n    price: '10'\n    stock: 1\n    category: balones\n  - name: Balón\n    price: '10'\n    stock: -1\n    category: balones\n",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "2 validation errors found");
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(
            parse("products:\n  - name: Gorra\n    price: '1'\n    stock: 1\n    category: gorras\n")
                .is_err()
        );
    }
}
