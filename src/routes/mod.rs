//! HTTP surface: route assembly and handlers per resource.

pub mod cart;
pub mod orders;
pub mod users;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/users", users::router())
        .nest("/api/cart", cart::router())
        .nest("/api/orders", orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "shopcore"}))
}
