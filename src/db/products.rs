//! Product lookups and the inventory ledger.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Product;

pub async fn find(
    exec: impl PgExecutor<'_>,
    product_id: Uuid,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(exec)
        .await
}

/// Conditional stock decrement. Returns `false` when the product's stock is
/// no longer sufficient at write time; the caller must treat that as a lost
/// race and abort. This is the only place stock is mutated.
pub async fn decrement_stock(
    exec: impl PgExecutor<'_>,
    product_id: Uuid,
    quantity: i32,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE products SET stock = stock - $2 WHERE product_id = $1 AND stock >= $2")
            .bind(product_id)
            .bind(quantity)
            .execute(exec)
            .await?;
    Ok(result.rows_affected() == 1)
}
