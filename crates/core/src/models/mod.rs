//! Wire models shared by the API and its clients.
//!
//! Field names follow the JSON the storefront client already speaks:
//! snake_case columns, except `productId` / `imageUrl` where the client
//! sends or reads camelCase.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartLineRequest, ValidateCartRequest, ValidatedCart, ValidatedLine};
pub use order::{CreateOrderRequest, Order, OrderItemInput, OrderLine, OrderWithItems};
pub use product::{Product, ProductInput, StockReduction};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, User};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A request body that failed a field-level check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Largest amount a `NUMERIC(12,2)` money column holds: 9999999999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Check a money amount fits the money columns.
///
/// The database rounds to cents half away from zero before storing, so the
/// bound applies to the rounded value.
pub(crate) fn check_amount(field: &str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        return Err(ValidationError(format!("{field} cannot be negative")));
    }
    if amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) > MAX_AMOUNT {
        return Err(ValidationError(format!(
            "{field} cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Generic `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Create a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every failing API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response of `POST /api/upload/image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_max_amount_is_largest_numeric_12_2() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }

    #[test]
    fn test_check_amount_bounds() {
        assert!(check_amount("price", Decimal::ZERO).is_ok());
        assert!(check_amount("price", MAX_AMOUNT).is_ok());
        assert!(check_amount("price", "9999999999.994".parse().unwrap()).is_ok());

        let err = check_amount("price", "10000000000".parse().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "price cannot exceed 9999999999.99");

        // Rounds up to 10000000000.00 on insert.
        assert!(check_amount("price", "9999999999.995".parse().unwrap()).is_err());

        let err = check_amount("price", Decimal::from(-1)).unwrap_err();
        assert_eq!(err.to_string(), "price cannot be negative");
    }
}
