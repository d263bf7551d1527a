//! User routes: signup, login, order history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::UserRole;
use crate::error::AppError;
use crate::models::{ApiResponse, OrderDetails};
use crate::service;
use crate::service::users::NewUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/:user_id/orders", get(order_history))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 4, max = 10, message = "Name must be between 4 and 10 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 10, message = "Password must be between 6 and 10 characters"))]
    pub password: String,
    #[validate(length(min = 10, message = "Address must be at least 10 characters"))]
    pub address: String,
    pub gender: Option<Gender>,
    pub role: Option<UserRole>,
}

async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    body.validate()?;
    service::users::signup(
        &state.db,
        NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            address: body.address,
            gender: body.gender.unwrap_or(Gender::Male).as_str().to_string(),
            role: body.role.unwrap_or(UserRole::User),
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("User created successfully!")),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    body.validate()?;
    let token =
        service::users::login(&state.db, &body.email, &body.password, state.token_ttl).await?;
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            success: true,
            token,
        }),
    ))
}

async fn order_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<OrderDetails>>>, AppError> {
    let history = service::orders::order_history(&state.db, user_id, auth.0).await?;
    Ok(Json(ApiResponse::result(history)))
}
