//! Order and Payment entities and repository traits.
//!
//! Maps to the `orders`, `order_items` and `payments` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Order lifecycle status matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "paid" => Self::Paid,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payment status matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A purchased line, with the price frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub bundle_id: Option<Uuid>,
    pub price: Decimal,
}

/// An order created from a checked-out cart.
///
/// Maps to the `orders` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL
/// - cart_id: UUID NOT NULL REFERENCES carts(id)
/// - status: VARCHAR(16) NOT NULL DEFAULT 'pending'
/// - total: NUMERIC(12,2) NOT NULL CHECK (total >= 0)
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cart_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment attempt for an order.
///
/// Maps to the `payments` table:
/// - id: UUID PRIMARY KEY
/// - order_id: UUID NOT NULL REFERENCES orders(id)
/// - amount: NUMERIC(12,2) NOT NULL
/// - status: VARCHAR(16) NOT NULL DEFAULT 'pending'
/// - provider_reference: VARCHAR(255) NULL
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Order data access operations.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order with its items.
    async fn create(&self, order: &Order) -> Result<Order, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// Orders placed by a user, newest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), AppError>;
}

/// Repository trait for Payment data access operations.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError>;

    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<Payment>, AppError>;

    /// Record the provider's outcome for a payment.
    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider_reference: Option<String>,
    ) -> Result<(), AppError>;
}
