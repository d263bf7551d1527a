//! Database row types and response shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{OrderStatus, UserRole};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub gender: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub cart_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub cart_line_id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart line joined with its product for stock checks and display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLineProduct {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub coupon_id: Option<Uuid>,
    pub final_price: Option<Decimal>,
}

/// Order line joined with the product name. `price` is the snapshot taken
/// at order creation, not the live product price.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLineProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Coupon {
    pub coupon_id: Uuid,
    pub code: String,
    pub discount: Decimal,
}

// =============================================================================
// Response shapes
// =============================================================================

/// Uniform response envelope: `{success, message?, result?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            result: None,
        }
    }

    pub fn result(result: T) -> Self {
        Self {
            success: true,
            message: None,
            result: Some(result),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Formatted order detail returned by the read and coupon paths.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub user: UserSummary,
    pub total_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_applied: Option<Decimal>,
    pub products: Vec<OrderLineView>,
}

/// Compact summary returned right after order creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub final_price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// Cart view with resolved products and a running total at live prices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Uuid,
    pub user: UserSummary,
    pub products: Vec<CartLineView>,
    pub total: Decimal,
}
