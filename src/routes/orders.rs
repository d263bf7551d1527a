//! Order routes: creation from the cart, status updates (admin), detail
//! reads and coupon application.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::OrderStatus;
use crate::error::AppError;
use crate::models::{ApiResponse, OrderDetails, OrderSummary};
use crate::service;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/apply-coupon", post(apply_coupon))
        .route("/:order_id/status", put(update_status))
        .route("/:order_id", get(get_by_id))
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<OrderSummary>>), AppError> {
    let summary = service::orders::create_order(&state.db, &state.events, auth.0.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            message: Some("Order created successfully".into()),
            result: Some(summary),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;
    let status =
        service::orders::update_status(&state.db, &state.events, order_id, body.status).await?;
    Ok(Json(ApiResponse::message(format!(
        "Status Updated to {status}"
    ))))
}

async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetails>>, AppError> {
    let details = service::orders::get_order(&state.db, order_id, auth.0).await?;
    Ok(Json(ApiResponse::result(details)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub order_id: Uuid,
    #[validate(length(min = 6, message = "Coupon code must be at least 6 characters"))]
    pub discount_number: String,
}

async fn apply_coupon(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ApplyCouponRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetails>>), AppError> {
    body.validate()?;
    let details = service::orders::apply_coupon(
        &state.db,
        &state.events,
        body.order_id,
        &body.discount_number,
        auth.0.user_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::result(details))))
}
