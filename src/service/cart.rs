//! Cart operations: add, overwrite, remove and view line items.
//!
//! Stock checks here are advisory ceilings at write time; the binding check
//! is the conditional decrement performed during order conversion.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db;
use crate::domain::{pricing, AuthContext};
use crate::models::{CartLineView, CartView, UserSummary};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("product not found")]
    ProductNotFound,
    #[error("requested quantity exceeds available stock")]
    InsufficientStock,
    #[error("cart missing for an existing user")]
    CartMissing,
    #[error("product is not in the cart")]
    NotInCart,
    #[error("cart line not found")]
    LineNotFound,
    #[error("cart belongs to another user")]
    Forbidden,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Adds `quantity` of a product, merging into an existing line if present.
/// The merged quantity must stay within the product's current stock.
pub async fn add_line(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), CartError> {
    let product = db::products::find(pool, product_id)
        .await?
        .ok_or(CartError::ProductNotFound)?;
    if product.stock < quantity {
        return Err(CartError::InsufficientStock);
    }

    // Every user gets a cart at signup; a missing row is an inconsistency.
    let cart = db::carts::find_by_user(pool, user_id)
        .await?
        .ok_or(CartError::CartMissing)?;

    // Upsert so two concurrent adds of a new product merge instead of one
    // tripping the (cart_id, product_id) unique constraint. The merge runs
    // in SQL, where an int4 overflow surfaces as a numeric range error.
    let mut tx = pool.begin().await?;
    let line = db::carts::upsert_line(&mut *tx, cart.cart_id, product_id, quantity)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003") => {
                CartError::InsufficientStock
            }
            _ => CartError::Database(e),
        })?;
    if product.stock < line.quantity {
        tx.rollback().await?;
        return Err(CartError::InsufficientStock);
    }
    tx.commit().await?;
    Ok(())
}

/// Overwrites (not adds to) the line's quantity.
pub async fn update_line(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), CartError> {
    let product = db::products::find(pool, product_id)
        .await?
        .ok_or(CartError::ProductNotFound)?;
    let cart = db::carts::find_by_user(pool, user_id)
        .await?
        .ok_or(CartError::CartMissing)?;
    let line = db::carts::find_line(pool, cart.cart_id, product_id)
        .await?
        .ok_or(CartError::NotInCart)?;
    if product.stock < quantity {
        return Err(CartError::InsufficientStock);
    }
    db::carts::set_line_quantity(pool, line.cart_line_id, quantity).await?;
    Ok(())
}

pub async fn remove_line(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<(), CartError> {
    let cart = db::carts::find_by_user(pool, user_id)
        .await?
        .ok_or(CartError::CartMissing)?;
    let line = db::carts::find_line(pool, cart.cart_id, product_id)
        .await?
        .ok_or(CartError::LineNotFound)?;
    db::carts::delete_line(pool, line.cart_line_id).await?;
    Ok(())
}

/// Resolves the cart with product details and a running total at live
/// prices (the cart is pre-purchase, so nothing is snapshotted here).
/// Returns `None` for an empty cart. Users may only view their own cart;
/// admins are unrestricted.
pub async fn view(
    pool: &PgPool,
    target_user_id: Uuid,
    requester: AuthContext,
) -> Result<Option<CartView>, CartError> {
    if !requester.role.is_admin() && target_user_id != requester.user_id {
        return Err(CartError::Forbidden);
    }

    let cart = db::carts::find_by_user(pool, target_user_id)
        .await?
        .ok_or(CartError::CartMissing)?;
    let lines = db::carts::lines_with_products(pool, cart.cart_id).await?;
    if lines.is_empty() {
        return Ok(None);
    }

    let user = db::users::find_by_id(pool, target_user_id)
        .await?
        .ok_or(CartError::CartMissing)?;

    let total = pricing::order_total(lines.iter().map(|l| (l.quantity, l.price)));
    let products = lines
        .into_iter()
        .map(|l| CartLineView {
            product_id: l.product_id,
            name: l.name,
            description: l.description,
            unit_price: l.price,
            quantity: l.quantity,
            subtotal: pricing::line_subtotal(l.quantity, l.price),
        })
        .collect();

    Ok(Some(CartView {
        cart_id: cart.cart_id,
        user: UserSummary {
            name: user.name,
            email: user.email,
        },
        products,
        total,
    }))
}
