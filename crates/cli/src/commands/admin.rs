//! Admin account management.
//!
//! # Usage
//!
//! ```bash
//! golazo-cli admin create -e admin@golazo.co -n "Admin" -p "una-clave-larga"
//! ```

use golazo_api::db::{NewUser, PgStore, RepositoryError, UserStore};
use golazo_api::services::auth::{AuthError, MIN_PASSWORD_LENGTH, hash_password};
use golazo_core::{Email, Role, UserId};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error("Name is required")]
    MissingName,

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Connect(String),
}

/// Check the arguments before connecting.
fn validate(email: &str, name: &str, password: &str) -> Result<Email, AdminError> {
    if name.trim().is_empty() {
        return Err(AdminError::MissingName);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }
    Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

/// Create an account with the `admin` role.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let email = validate(email, name, password)?;

    let pool = super::connect()
        .await
        .map_err(|e| AdminError::Connect(e.to_string()))?;
    let store = PgStore::new(pool);

    tracing::info!("Creating admin user: {}", email);

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AdminError::UserExists(email.to_string()));
    }

    let password_hash = hash_password(password)?;
    let user = store
        .create_user(NewUser {
            name: name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_arguments() {
        assert!(matches!(
            validate("admin@golazo.co", " ", "una-clave-larga"),
            Err(AdminError::MissingName)
        ));
        assert!(matches!(
            validate("admin@golazo.co", "Admin", "corta"),
            Err(AdminError::WeakPassword)
        ));
        assert!(matches!(
            validate("admin-golazo.co", "Admin", "una-clave-larga"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(validate("Admin@Golazo.co", "Admin", "una-clave-larga").is_ok());
    }
}
