//! Cart and cart-line persistence.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Cart, CartLine, CartLineProduct};

pub async fn create(exec: impl PgExecutor<'_>, user_id: Uuid) -> Result<Cart, sqlx::Error> {
    sqlx::query_as::<_, Cart>("INSERT INTO carts (cart_id, user_id) VALUES ($1, $2) RETURNING *")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .fetch_one(exec)
        .await
}

pub async fn find_by_user(
    exec: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Option<Cart>, sqlx::Error> {
    sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(exec)
        .await
}

pub async fn find_line(
    exec: impl PgExecutor<'_>,
    cart_id: Uuid,
    product_id: Uuid,
) -> Result<Option<CartLine>, sqlx::Error> {
    sqlx::query_as::<_, CartLine>(
        "SELECT * FROM cart_lines WHERE cart_id = $1 AND product_id = $2",
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(exec)
    .await
}

/// Inserts a line or merges the quantity into an existing one. The unique
/// constraint on (cart_id, product_id) makes this safe under concurrent adds.
pub async fn upsert_line(
    exec: impl PgExecutor<'_>,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<CartLine, sqlx::Error> {
    sqlx::query_as::<_, CartLine>(
        "INSERT INTO cart_lines (cart_line_id, cart_id, product_id, quantity) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (cart_id, product_id) \
         DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(exec)
    .await
}

pub async fn set_line_quantity(
    exec: impl PgExecutor<'_>,
    cart_line_id: Uuid,
    quantity: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cart_lines SET quantity = $2 WHERE cart_line_id = $1")
        .bind(cart_line_id)
        .bind(quantity)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn delete_line(
    exec: impl PgExecutor<'_>,
    cart_line_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE cart_line_id = $1")
        .bind(cart_line_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Cart lines joined with their products, for stock checks, price snapshots
/// and the cart view.
pub async fn lines_with_products(
    exec: impl PgExecutor<'_>,
    cart_id: Uuid,
) -> Result<Vec<CartLineProduct>, sqlx::Error> {
    sqlx::query_as::<_, CartLineProduct>(
        "SELECT cl.product_id, cl.quantity, p.name, p.description, p.price, p.stock \
         FROM cart_lines cl \
         JOIN products p ON p.product_id = cl.product_id \
         WHERE cl.cart_id = $1",
    )
    .bind(cart_id)
    .fetch_all(exec)
    .await
}

pub async fn clear(exec: impl PgExecutor<'_>, cart_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
        .bind(cart_id)
        .execute(exec)
        .await?;
    Ok(())
}
