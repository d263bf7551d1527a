//! Order and order-line persistence.

use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::OrderStatus;
use crate::models::{Order, OrderLineProduct};

pub async fn insert(
    exec: impl PgExecutor<'_>,
    user_id: Uuid,
    final_price: Decimal,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders (order_id, user_id, final_price) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(final_price)
    .fetch_one(exec)
    .await
}

/// Order lines are written once, at conversion time, and never updated.
pub async fn insert_line(
    exec: impl PgExecutor<'_>,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_lines (order_line_id, order_id, product_id, quantity, price) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::now_v7())
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn find(
    exec: impl PgExecutor<'_>,
    order_id: Uuid,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_user(
    exec: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = $1 ORDER BY order_date DESC")
        .bind(user_id)
        .fetch_all(exec)
        .await
}

/// Lines joined with product names; `price` stays the creation-time snapshot.
pub async fn lines_with_products(
    exec: impl PgExecutor<'_>,
    order_id: Uuid,
) -> Result<Vec<OrderLineProduct>, sqlx::Error> {
    sqlx::query_as::<_, OrderLineProduct>(
        "SELECT ol.product_id, p.name AS product_name, ol.quantity, ol.price \
         FROM order_lines ol \
         JOIN products p ON p.product_id = ol.product_id \
         WHERE ol.order_id = $1",
    )
    .bind(order_id)
    .fetch_all(exec)
    .await
}

pub async fn set_status(
    exec: impl PgExecutor<'_>,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
        .bind(order_id)
        .bind(status)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn set_coupon(
    exec: impl PgExecutor<'_>,
    order_id: Uuid,
    coupon_id: Uuid,
    final_price: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET coupon_id = $2, final_price = $3 WHERE order_id = $1")
        .bind(order_id)
        .bind(coupon_id)
        .bind(final_price)
        .execute(exec)
        .await?;
    Ok(())
}
