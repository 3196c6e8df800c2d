//! Discount entity and repository trait.
//!
//! Maps to the `discounts` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A time-boxed percentage discount on a single product.
///
/// Maps to the `discounts` table:
/// - id: UUID PRIMARY KEY
/// - product_id: UUID NOT NULL REFERENCES products(id)
/// - percent: NUMERIC(5,2) NOT NULL CHECK (percent BETWEEN 0 AND 100)
/// - starts_at: TIMESTAMPTZ NOT NULL
/// - ends_at: TIMESTAMPTZ NULL (open-ended when NULL)
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: Uuid,
    pub product_id: Uuid,
    pub percent: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Discount {
    /// Check whether the discount applies at the given instant.
    ///
    /// The window is half-open: `starts_at <= now < ends_at`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_deleted
            && self.starts_at <= now
            && self.ends_at.map_or(true, |end| now < end)
    }
}

/// Repository trait for Discount data access operations.
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Find the non-deleted discounts for the given products that are active at `now`.
    async fn find_active_for_products(
        &self,
        product_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Discount>, AppError>;

    /// Insert a discount.
    async fn create(&self, discount: &Discount) -> Result<Discount, AppError>;
}
