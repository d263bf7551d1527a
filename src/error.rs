//! Application error type and its HTTP mapping.
//!
//! Services raise closed, typed error enums ([`crate::service::cart::CartError`],
//! [`crate::service::orders::OrderError`], [`crate::auth::AuthError`]); handlers
//! convert them into [`AppError`] with `?` and axum renders the stable
//! `{success: false, message}` envelope. Internal failures are logged and
//! never leak details to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::AuthError;
use crate::service::cart::CartError;
use crate::service::orders::OrderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) | Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Database(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound => Self::NotFound("Product not found".into()),
            CartError::InsufficientStock => {
                Self::BadRequest("Insufficient product stock for the desired quantity".into())
            }
            CartError::CartMissing => {
                Self::Conflict("Something went wrong! Contact the support".into())
            }
            CartError::NotInCart => Self::BadRequest("Product is not in the cart".into()),
            CartError::LineNotFound => Self::NotFound("Product not found in cart".into()),
            CartError::Forbidden => Self::Forbidden("Unauthorized access to cart".into()),
            CartError::Database(e) => Self::Database(e),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart => {
                Self::BadRequest("Cart is empty. Cannot create order".into())
            }
            OrderError::InsufficientStock(product_id) => {
                Self::BadRequest(format!("Insufficient stock for product {product_id}"))
            }
            OrderError::OrderNotFound => Self::NotFound("Order not found".into()),
            OrderError::Forbidden => {
                Self::Forbidden("You don't have access to this order".into())
            }
            OrderError::HistoryForbidden => Self::Forbidden(
                "You do not have access to this user's order history".into(),
            ),
            OrderError::CouponNotFound => Self::NotFound("Coupon not found".into()),
            OrderError::NoOrders => Self::NotFound("No orders found".into()),
            OrderError::Database(e) => Self::Database(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => Self::Conflict("User already exists!".into()),
            AuthError::UserNotFound => Self::NotFound("User not found".into()),
            AuthError::InvalidPassword => Self::BadRequest("Invalid Password".into()),
            AuthError::InvalidToken => Self::Unauthorized("Token invalid".into()),
            AuthError::Hash(msg) => Self::Internal(msg),
            AuthError::Database(e) => Self::Database(e),
        }
    }
}
