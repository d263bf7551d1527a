//! Bearer-token session storage.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::AuthContext;

pub async fn insert(
    exec: impl PgExecutor<'_>,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(exec)
        .await?;
    Ok(())
}

/// Resolves a presented token to the identity it was issued for, ignoring
/// expired sessions.
pub async fn resolve(
    exec: impl PgExecutor<'_>,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<AuthContext>, sqlx::Error> {
    sqlx::query_as::<_, AuthContext>(
        "SELECT u.user_id, u.role \
         FROM sessions s \
         JOIN users u ON u.user_id = s.user_id \
         WHERE s.token = $1 AND s.expires_at > $2",
    )
    .bind(token)
    .bind(now)
    .fetch_optional(exec)
    .await
}
