//! Authentication: password hashing, bearer-token sessions and the
//! request extractor that resolves `Authorization: Bearer <token>` into an
//! [`AuthContext`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use uuid::Uuid;

use crate::db;
use crate::domain::AuthContext;
use crate::error::AppError;
use crate::AppState;

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => AuthError::InvalidPassword,
            other => AuthError::Hash(other.to_string()),
        })
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Creates a session row and returns the opaque bearer token for it.
pub async fn issue_token(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    ttl: Duration,
) -> Result<String, AuthError> {
    let token = generate_token();
    db::sessions::insert(pool, &token, user_id, Utc::now() + ttl).await?;
    Ok(token)
}

/// Extractor requiring a valid bearer token. Handlers take `AuthUser` as a
/// parameter and get the resolved identity; requests without a live session
/// are rejected with 401 before the handler runs.
pub struct AuthUser(pub AuthContext);

impl AuthUser {
    /// Role gate for admin-only routes.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Can't access".into()))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::InvalidToken)?;

        let ctx = db::sessions::resolve(&state.db, token, Utc::now())
            .await
            .map_err(AuthError::Database)?
            .ok_or(AuthError::InvalidToken)?;

        Ok(Self(ctx))
    }
}
