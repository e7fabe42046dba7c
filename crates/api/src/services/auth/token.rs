//! Signed bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use golazo_core::{Role, User, UserId};

use super::AuthError;

/// Tokens expire this long after issue. There is no refresh.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The authenticated user's id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if `sub` is not a numeric id.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Keys used to sign and verify tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Sign a token for `user`, valid for [`TOKEN_TTL_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenEncoding)
    }

    /// Check a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use golazo_core::Email;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&SecretString::from(secret))
    }

    fn user() -> User {
        User {
            id: UserId::new(7),
            name: "Admin".to_owned(),
            email: Email::parse("admin@golazo.co").unwrap(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys("k7$Qp2!vR9@xM4#tL8&wZ1^bN6*cF3%h");
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), UserId::new(7));
        assert_eq!(claims.email, "admin@golazo.co");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let token = keys("k7$Qp2!vR9@xM4#tL8&wZ1^bN6*cF3%h")
            .issue(&user())
            .unwrap();
        let err = keys("Zz9!yY8@xX7#wW6$vV5%uU4^tT3&sS2*")
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys("k7$Qp2!vR9@xM4#tL8&wZ1^bN6*cF3%h");
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1);
        let claims = Claims {
            sub: "7".to_owned(),
            email: "admin@golazo.co".to_owned(),
            role: Role::Admin,
            iat: issued.timestamp(),
            exp: (issued + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(keys("k7$Qp2!vR9@xM4#tL8&wZ1^bN6*cF3%h").verify("not.a.token").is_err());
    }
}
