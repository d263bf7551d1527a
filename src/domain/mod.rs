//! Core domain types: roles, order status, authenticated identity.

pub mod pricing;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role, matched exhaustively at every authorization point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Order status. Transitions are admin-triggered and unconstrained;
/// the service only checks the order exists before overwriting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity resolved from a bearer token, threaded explicitly into every
/// operation that needs authorization. Never inferred from ambient state.
#[derive(Clone, Copy, Debug, sqlx::FromRow)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(UserRole::Admin.as_str(), "ADMIN");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn test_status_serde_uses_uppercase_labels() {
        let s: OrderStatus = serde_json::from_str("\"SHIPPED\"").unwrap();
        assert_eq!(s, OrderStatus::Shipped);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"SHIPPED\"");
        assert_eq!(OrderStatus::Cancelled.to_string(), "CANCELLED");
    }
}
