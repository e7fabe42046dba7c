//! Liveness, readiness and database check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DbTestResponse {
    message: &'static str,
    time: DateTime<Utc>,
}

/// `GET /api/test`: round-trip to the database and report its clock.
pub async fn db_test(State(state): State<AppState>) -> Result<Json<DbTestResponse>> {
    let time = state.store().ping().await?;
    Ok(Json(DbTestResponse {
        message: "Database connected",
        time,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = TestApp::new();

        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, _) = app.get("/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.get("/api/test", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Database connected");
        assert!(body["time"].is_string());
    }
}
