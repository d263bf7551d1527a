//! Order operations: the cart-to-order conversion, status updates, reads
//! with ownership checks, coupon application and order history.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db;
use crate::domain::{pricing, AuthContext, OrderStatus};
use crate::events::{EventPublisher, OrderEvent};
use crate::models::{Order, OrderDetails, OrderLineProduct, OrderLineView, OrderSummary, UserSummary};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("insufficient stock for product {0}")]
    InsufficientStock(Uuid),
    #[error("order not found")]
    OrderNotFound,
    #[error("order belongs to another user")]
    Forbidden,
    #[error("order history belongs to another user")]
    HistoryForbidden,
    #[error("coupon not found")]
    CouponNotFound,
    #[error("no orders found")]
    NoOrders,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Converts the user's cart into an order.
///
/// The whole sequence runs in one transaction: snapshot the cart lines at
/// current prices, write the order and its lines, conditionally decrement
/// stock per line, clear the cart. A decrement that finds insufficient
/// stock at write time (a race lost since the read) aborts everything, so
/// no partial order, decrement or cart state can persist.
pub async fn create_order(
    pool: &PgPool,
    events: &EventPublisher,
    user_id: Uuid,
) -> Result<OrderSummary, OrderError> {
    let mut tx = pool.begin().await?;

    // A missing cart cannot happen for a signed-up user; treat it as empty.
    let Some(cart) = db::carts::find_by_user(&mut *tx, user_id).await? else {
        return Err(OrderError::EmptyCart);
    };
    let lines = db::carts::lines_with_products(&mut *tx, cart.cart_id).await?;
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    // Read-time check; names the offending product before any write.
    for line in &lines {
        if line.stock < line.quantity {
            return Err(OrderError::InsufficientStock(line.product_id));
        }
    }

    let final_price = pricing::order_total(lines.iter().map(|l| (l.quantity, l.price)));
    let order = db::orders::insert(&mut *tx, user_id, final_price).await?;
    for line in &lines {
        db::orders::insert_line(&mut *tx, order.order_id, line.product_id, line.quantity, line.price)
            .await?;
    }

    // Write-time check: the decrement only succeeds while stock covers the
    // quantity, so concurrent conversions cannot drive stock negative.
    for line in &lines {
        if !db::products::decrement_stock(&mut *tx, line.product_id, line.quantity).await? {
            return Err(OrderError::InsufficientStock(line.product_id));
        }
    }

    db::carts::clear(&mut *tx, cart.cart_id).await?;
    tx.commit().await?;

    events
        .publish(OrderEvent::Created {
            order_id: order.order_id,
            user_id,
            final_price,
        })
        .await;

    Ok(OrderSummary {
        order_id: order.order_id,
        order_date: order.order_date,
        status: order.status,
        final_price,
    })
}

/// Overwrites the order's status. Any transition is accepted; only
/// existence is checked. Callers gate this to admins.
pub async fn update_status(
    pool: &PgPool,
    events: &EventPublisher,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<OrderStatus, OrderError> {
    db::orders::find(pool, order_id)
        .await?
        .ok_or(OrderError::OrderNotFound)?;
    db::orders::set_status(pool, order_id, status).await?;

    events
        .publish(OrderEvent::StatusUpdated { order_id, status })
        .await;

    Ok(status)
}

/// Fetches an order. Admins may read any order; users only their own.
pub async fn get_order(
    pool: &PgPool,
    order_id: Uuid,
    requester: AuthContext,
) -> Result<OrderDetails, OrderError> {
    let order = db::orders::find(pool, order_id)
        .await?
        .ok_or(OrderError::OrderNotFound)?;
    if !requester.role.is_admin() && order.user_id != requester.user_id {
        return Err(OrderError::Forbidden);
    }
    format_order(pool, &order).await
}

/// Applies a flat-discount coupon to the order's snapshotted total, floored
/// at zero. Only the order's owner may apply a coupon; admins are not
/// exempt. A second coupon overwrites the first, and re-applying the same
/// code recomputes from the snapshot, so the result is idempotent.
pub async fn apply_coupon(
    pool: &PgPool,
    events: &EventPublisher,
    order_id: Uuid,
    code: &str,
    requester_user_id: Uuid,
) -> Result<OrderDetails, OrderError> {
    let order = db::orders::find(pool, order_id)
        .await?
        .ok_or(OrderError::OrderNotFound)?;
    if order.user_id != requester_user_id {
        return Err(OrderError::Forbidden);
    }

    let coupon = db::coupons::find_by_code(pool, code)
        .await?
        .ok_or(OrderError::CouponNotFound)?;

    let lines = db::orders::lines_with_products(pool, order_id).await?;
    let total = pricing::order_total(lines.iter().map(|l| (l.quantity, l.price)));
    let final_price = pricing::discounted_total(total, coupon.discount);

    db::orders::set_coupon(pool, order_id, coupon.coupon_id, final_price).await?;

    events
        .publish(OrderEvent::CouponApplied {
            order_id,
            coupon_id: coupon.coupon_id,
            final_price,
        })
        .await;

    let user = load_user_summary(pool, order.user_id).await?;
    Ok(OrderDetails {
        order_id: order.order_id,
        order_date: order.order_date,
        status: order.status,
        user,
        total_price: final_price,
        discount_applied: Some(coupon.discount),
        products: format_lines(&lines),
    })
}

/// Order history for a user. Admins may read anyone's history; users only
/// their own. Zero orders is reported as not found.
pub async fn order_history(
    pool: &PgPool,
    target_user_id: Uuid,
    requester: AuthContext,
) -> Result<Vec<OrderDetails>, OrderError> {
    if !requester.role.is_admin() && target_user_id != requester.user_id {
        return Err(OrderError::HistoryForbidden);
    }

    let orders = db::orders::find_by_user(pool, target_user_id).await?;
    if orders.is_empty() {
        return Err(OrderError::NoOrders);
    }

    let user = load_user_summary(pool, target_user_id).await?;
    let mut history = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = db::orders::lines_with_products(pool, order.order_id).await?;
        let total = order
            .final_price
            .unwrap_or_else(|| pricing::order_total(lines.iter().map(|l| (l.quantity, l.price))));
        history.push(OrderDetails {
            order_id: order.order_id,
            order_date: order.order_date,
            status: order.status,
            user: UserSummary {
                name: user.name.clone(),
                email: user.email.clone(),
            },
            total_price: total,
            discount_applied: None,
            products: format_lines(&lines),
        });
    }
    Ok(history)
}

async fn format_order(pool: &PgPool, order: &Order) -> Result<OrderDetails, OrderError> {
    let lines = db::orders::lines_with_products(pool, order.order_id).await?;
    let total = order
        .final_price
        .unwrap_or_else(|| pricing::order_total(lines.iter().map(|l| (l.quantity, l.price))));
    let user = load_user_summary(pool, order.user_id).await?;
    Ok(OrderDetails {
        order_id: order.order_id,
        order_date: order.order_date,
        status: order.status,
        user,
        total_price: total,
        discount_applied: None,
        products: format_lines(&lines),
    })
}

fn format_lines(lines: &[OrderLineProduct]) -> Vec<OrderLineView> {
    lines
        .iter()
        .map(|l| OrderLineView {
            product_id: l.product_id,
            product_name: l.product_name.clone(),
            quantity: l.quantity,
            unit_price: l.price,
            subtotal: pricing::line_subtotal(l.quantity, l.price),
        })
        .collect()
}

async fn load_user_summary(pool: &PgPool, user_id: Uuid) -> Result<UserSummary, OrderError> {
    let user = db::users::find_by_id(pool, user_id)
        .await?
        .ok_or(OrderError::Database(sqlx::Error::RowNotFound))?;
    Ok(UserSummary {
        name: user.name,
        email: user.email,
    })
}
