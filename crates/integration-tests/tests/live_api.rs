//! Tests against a running API backed by `PostgreSQL`.
//!
//! These tests require:
//! - A migrated database (`golazo-cli migrate`)
//! - The API server running (`cargo run -p golazo-api`)
//!
//! Run with: `cargo test -p golazo-integration-tests -- --ignored`

use golazo_client::{ApiClient, CartItem, CartStore, checkout};
use golazo_core::Category;
use golazo_integration_tests::{api_base_url, product_input, signed_in, unique_email};
use reqwest::StatusCode;
use serde_json::Value;

fn client() -> ApiClient {
    ApiClient::new(&api_base_url()).expect("Invalid GOLAZO_API_URL")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_database_round_trip() {
    let resp = reqwest::get(format!("{}/api/test", api_base_url()))
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Database connected");
    assert!(body["time"].is_string());

    client().health().await.expect("Health check failed");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_filter() {
    let client = client();
    let created = client
        .create_product(&product_input("Balón de prueba", 10_000, 2, Category::Balones))
        .await
        .expect("Failed to create product");

    let balones = client
        .products(Some(Category::Balones))
        .await
        .expect("Failed to list products");
    assert!(balones.iter().all(|p| p.category == Category::Balones));
    assert!(balones.iter().any(|p| p.id == created.id));

    client
        .delete_product(created.id)
        .await
        .expect("Failed to delete product");
    let err = client.product(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reduce_stock_never_goes_negative() {
    let client = client();
    let product = client
        .create_product(&product_input("Stock de prueba", 5_000, 2, Category::Souvenirs))
        .await
        .expect("Failed to create product");

    let updated = client.reduce_stock(product.id, 2).await.expect("Reduce failed");
    assert_eq!(updated.stock, 0);

    let err = client.reduce_stock(product.id, 1).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    client.delete_product(product.id).await.ok();
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_full_checkout() {
    let (client, auth) = signed_in(&client(), &unique_email()).await;
    let product = client
        .create_product(&product_input("Camiseta de prueba", 350_000, 3, Category::Camisetas))
        .await
        .expect("Failed to create product");

    let cart = CartStore::new();
    cart.add(CartItem::from_product(&product, 2));

    let order = checkout(&client, &cart, None, "Calle 26 #59-51, Bogotá")
        .await
        .expect("Checkout failed");
    assert_eq!(order.user_id, auth.user.id);
    assert!(cart.is_empty());

    let history = client.my_orders(None).await.expect("Failed to load orders");
    let placed = history
        .iter()
        .find(|o| o.order.id == order.id)
        .expect("Order missing from history");
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 2);

    // Deleting the product keeps the order line with its price.
    client.delete_product(product.id).await.expect("Delete failed");
    let detail = client.order(order.id).await.expect("Failed to load order");
    assert_eq!(detail.items[0].product_id, None);
    assert_eq!(detail.items[0].price, product.price);
}
