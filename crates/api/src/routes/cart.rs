//! Cart validation handler.
//!
//! The cart itself lives on the client; this endpoint re-prices it against
//! the catalog and checks stock before checkout.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use golazo_core::{ValidateCartRequest, ValidatedCart};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::cart::validate_cart;
use crate::state::AppState;

/// `POST /api/cart/validate` (bearer token required)
#[instrument(skip_all)]
pub async fn validate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: std::result::Result<Json<ValidateCartRequest>, JsonRejection>,
) -> Result<Json<ValidatedCart>> {
    let Json(request) = payload?;
    tracing::debug!(user_id = %user.id, lines = request.items.len(), "Validating cart");
    let cart = validate_cart(state.store(), &request.items).await?;
    Ok(Json(cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_requires_token() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/cart/validate", &json!({"items": []}), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access token required");

        let (status, _) = app
            .post("/api/cart/validate", &json!({"items": []}), Some("forged"))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validated_cart_totals() {
        let app = TestApp::new();
        let (_, token) = app.login_as("cliente@golazo.co").await;
        let bufanda = app.product("Bufanda", 45_000, 10).await;
        let balon = app.product("Balón", 520_000, 2).await;

        let (status, body) = app
            .post(
                "/api/cart/validate",
                &json!({"items": [
                    {"productId": bufanda.id, "quantity": 2},
                    {"productId": balon.id, "quantity": 1}
                ]}),
                Some(&token),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["subtotal"], "90000");
        assert_eq!(body["items"][1]["product"]["name"], "Balón");
        assert_eq!(body["total"], "610000");
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let app = TestApp::new();
        let (_, token) = app.login_as("cliente@golazo.co").await;
        let balon = app.product("Balón", 520_000, 2).await;

        let (status, body) = app
            .post(
                "/api/cart/validate",
                &json!({"items": [{"productId": balon.id, "quantity": 3}]}),
                Some(&token),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient stock for Balón. Available: 2");

        let (status, body) = app
            .post(
                "/api/cart/validate",
                &json!({"items": [{"productId": 999, "quantity": 1}]}),
                Some(&token),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product 999 not found");
    }
}
