//! Enumerated columns: product category, account role, order status.
//!
//! Each enum maps to a Postgres enum type (with the `postgres` feature) and
//! serializes to the same lowercase strings the database stores.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Product category. The catalog only sells these four kinds of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Camisetas,
    Balones,
    Accesorios,
    Souvenirs,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [
        Self::Camisetas,
        Self::Balones,
        Self::Accesorios,
        Self::Souvenirs,
    ];

    /// The stored/wire name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Camisetas => "camisetas",
            Self::Balones => "balones",
            Self::Accesorios => "accesorios",
            Self::Souvenirs => "souvenirs",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

/// Order status.
///
/// Orders are written as `Confirmed` at checkout; the other states exist in
/// the schema for fulfilment tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    #[default]
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("zapatos".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_wire_name() {
        let json = serde_json::to_string(&Category::Balones).unwrap();
        assert_eq!(json, "\"balones\"");
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: owner");
    }

    #[test]
    fn test_new_orders_are_confirmed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
    }
}
