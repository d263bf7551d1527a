//! Cart routes. All operate on the authenticated user's own cart except
//! the view, which admins may use for any user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{ApiResponse, CartView};
use crate::service;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add))
        .route("/update", put(update))
        .route("/remove", delete(remove))
        .route("/:user_id", get(view))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineRequest {
    pub product_id: Uuid,
}

async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CartLineRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    body.validate()?;
    service::cart::add_line(&state.db, auth.0.user_id, body.product_id, body.quantity).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Product added successfully to Cart")),
    ))
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate()?;
    service::cart::update_line(&state.db, auth.0.user_id, body.product_id, body.quantity).await?;
    Ok(Json(ApiResponse::message(
        "Product quantity updated successfully.",
    )))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RemoveLineRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    service::cart::remove_line(&state.db, auth.0.user_id, body.product_id).await?;
    Ok(Json(ApiResponse::message("Product removed successfully")))
}

async fn view(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let response = match service::cart::view(&state.db, user_id, auth.0).await? {
        Some(cart) => ApiResponse::result(cart),
        None => ApiResponse::message("Nothing in Cart"),
    };
    Ok(Json(response))
}
