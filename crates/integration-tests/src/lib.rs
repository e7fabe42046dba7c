//! End-to-end tests for Golazo.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (router on an ephemeral port, in-memory store)
//! cargo test -p golazo-integration-tests
//!
//! # Tests against a running server backed by PostgreSQL
//! GOLAZO_API_URL=http://localhost:3000 cargo test -p golazo-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use golazo_api::config::ApiConfig;
use golazo_api::db::MemoryStore;
use golazo_api::routes;
use golazo_api::state::AppState;
use golazo_client::ApiClient;
use golazo_core::{AuthResponse, Category, ProductInput, RegisterRequest};
use rust_decimal::Decimal;
use secrecy::SecretString;
use url::Url;
use uuid::Uuid;

/// Password used for every account the tests create.
pub const PASSWORD: &str = "camiseta10";

/// Base URL of an already running API (for the `#[ignore]`d tests).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("GOLAZO_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A server started in-process on an ephemeral port.
pub struct TestServer {
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    /// Serve the full router over a fresh in-memory store.
    pub async fn spawn() -> Self {
        Self::start(false).await
    }

    /// Same as [`TestServer::spawn`] with the auth rate limiter on, as in
    /// the default configuration.
    pub async fn spawn_rate_limited() -> Self {
        Self::start(true).await
    }

    async fn start(rate_limit: bool) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let base_url = format!("http://{addr}");

        let config = ApiConfig {
            database_url: SecretString::from("postgres://unused"),
            host: addr.ip(),
            port: addr.port(),
            public_url: Url::parse(&base_url).expect("Invalid base URL"),
            jwt_secret: SecretString::from("Zq8#Lm2$Vw5!Rt9@Ks3%Hj7^Np4&Fd6*"),
            upload_dir: std::env::temp_dir().join(format!("golazo-it-{}", Uuid::new_v4())),
            rate_limit,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let store = Arc::new(MemoryStore::new());
        let app = routes::router(AppState::new(config, store.clone()));
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        Self {
            client: ApiClient::new(&base_url).expect("Invalid base URL"),
            store,
        }
    }
}

/// Register `email` and return a client carrying its token.
pub async fn signed_in(client: &ApiClient, email: &str) -> (ApiClient, AuthResponse) {
    client
        .register(&RegisterRequest {
            name: "Hincha".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role: None,
        })
        .await
        .expect("Registration failed");
    let auth = client.login(email, PASSWORD).await.expect("Login failed");
    (client.with_token(auth.token.clone()), auth)
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("hincha-{}@golazo.co", Uuid::new_v4().simple())
}

/// Product input with the given price and stock.
#[must_use]
pub fn product_input(name: &str, price: i64, stock: i32, category: Category) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: format!("{name} de prueba"),
        price: Decimal::from(price),
        stock,
        category,
        team: "Atlético Nacional".to_string(),
        image_url: None,
        featured: false,
    }
}
