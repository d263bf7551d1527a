//! Best-effort domain event publication over NATS.
//!
//! Events are informational; a missing connection or a failed publish never
//! fails the request that produced the event.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::OrderStatus;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Created {
        order_id: Uuid,
        user_id: Uuid,
        final_price: Decimal,
    },
    StatusUpdated {
        order_id: Uuid,
        status: OrderStatus,
    },
    CouponApplied {
        order_id: Uuid,
        coupon_id: Uuid,
        final_price: Decimal,
    },
}

impl OrderEvent {
    fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "shopcore.orders.created",
            Self::StatusUpdated { .. } => "shopcore.orders.status_updated",
            Self::CouponApplied { .. } => "shopcore.orders.coupon_applied",
        }
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    client: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(client: Option<async_nats::Client>) -> Self {
        Self { client }
    }

    /// Publisher that drops every event; used when `NATS_URL` is unset and
    /// in tests.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn publish(&self, event: OrderEvent) {
        let Some(client) = &self.client else {
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize event");
                return;
            }
        };
        if let Err(e) = client
            .publish(event.subject().to_string(), payload.into())
            .await
        {
            tracing::warn!(error = %e, subject = event.subject(), "failed to publish event");
        }
    }
}
