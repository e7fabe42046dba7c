//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (record on span, echo in response)
//! 4. CORS (any origin)
//! 5. Rate limiting on `/api/auth/*` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthUser, OptionalAuth, RequireAuth};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
