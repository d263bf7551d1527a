//! User persistence.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::UserRole;
use crate::models::User;

pub async fn find_by_email(
    exec: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_id(
    exec: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(exec)
        .await
}

pub async fn insert(
    exec: impl PgExecutor<'_>,
    name: &str,
    email: &str,
    password_hash: &str,
    address: &str,
    gender: &str,
    role: UserRole,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (user_id, name, email, password_hash, address, gender, role) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(address)
    .bind(gender)
    .bind(role)
    .fetch_one(exec)
    .await
}
