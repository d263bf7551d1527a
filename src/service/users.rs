//! User signup and login.

use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, AuthError};
use crate::db;
use crate::domain::UserRole;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub gender: String,
    pub role: UserRole,
}

/// Creates the user and their cart in one transaction; every user owns
/// exactly one cart from signup onward.
pub async fn signup(pool: &PgPool, new_user: NewUser) -> Result<Uuid, AuthError> {
    if db::users::find_by_email(pool, &new_user.email)
        .await?
        .is_some()
    {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = auth::hash_password(&new_user.password)?;

    let mut tx = pool.begin().await?;
    let user = db::users::insert(
        &mut *tx,
        &new_user.name,
        &new_user.email,
        &password_hash,
        &new_user.address,
        &new_user.gender,
        new_user.role,
    )
    .await
    .map_err(|e| match &e {
        // Two concurrent signups can both pass the pre-check; the unique
        // constraint settles it.
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(e),
    })?;
    db::carts::create(&mut *tx, user.user_id).await?;
    tx.commit().await?;

    Ok(user.user_id)
}

/// Verifies credentials and issues a bearer session token.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    token_ttl: Duration,
) -> Result<String, AuthError> {
    let user = db::users::find_by_email(pool, email)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    auth::verify_password(password, &user.password_hash)?;
    auth::issue_token(pool, user.user_id, token_ttl).await
}
