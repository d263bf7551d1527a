//! shopcore — order-management backend.
//!
//! ## Features
//! - User signup/login with bearer-token sessions
//! - Cart line-item management
//! - Cart-to-order conversion with atomic inventory decrement
//! - Admin-driven order status transitions
//! - Flat-amount coupon discounting

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod service;

use axum::Router;
use chrono::Duration;
use sqlx::PgPool;

use crate::events::EventPublisher;

/// Shared state handed to every handler. The service is otherwise
/// stateless between requests.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub events: EventPublisher,
    pub token_ttl: Duration,
}

impl AppState {
    pub fn new(db: PgPool, events: EventPublisher, token_ttl: Duration) -> Self {
        Self {
            db,
            events,
            token_ttl,
        }
    }
}

/// Builds the application router; also the entry point for integration
/// tests driving the app with `tower::ServiceExt`.
pub fn app(state: AppState) -> Router {
    routes::router(state)
}
