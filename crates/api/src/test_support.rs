//! Helpers for driving the router in unit tests.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use golazo_core::{Category, Product, ProductInput};

use crate::config::ApiConfig;
use crate::config::tests::test_config;
use crate::db::MemoryStore;
use crate::routes;
use crate::state::AppState;

pub(crate) struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self::with_config(test_config())
    }

    pub(crate) fn with_config(config: ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        Self {
            router: routes::router(state),
            store,
        }
    }

    /// Send a request and return the status and the body as JSON
    /// (non-JSON bodies come back as a JSON string).
    pub(crate) async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub(crate) async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, None, token)).await
    }

    pub(crate) async fn post(
        &self,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, Some(body), token))
            .await
    }

    /// Register an account and log in, returning the user JSON and token.
    pub(crate) async fn login_as(&self, email: &str) -> (Value, String) {
        let (status, _) = self
            .post(
                "/api/auth/register",
                &json!({"name": "Hincha", "email": email, "password": "camiseta10"}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/auth/login",
                &json!({"email": email, "password": "camiseta10"}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_owned();
        (body["user"].clone(), token)
    }

    pub(crate) async fn product(&self, name: &str, price: i64, stock: i32) -> Product {
        self.store
            .insert_product(ProductInput {
                name: name.to_owned(),
                description: String::new(),
                price: Decimal::from(price),
                stock,
                category: Category::Camisetas,
                team: "Colombia".to_owned(),
                image_url: None,
                featured: false,
            })
            .await
    }
}

pub(crate) fn request(
    method: Method,
    uri: &str,
    body: Option<&Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Attach the peer address a served connection would carry.
pub(crate) fn from_peer(mut request: Request<Body>, peer: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 50_000))));
    request
}
