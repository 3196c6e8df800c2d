//! Bundle entity and repository trait.
//!
//! Maps to the `bundles` and `bundle_items` tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::sum_money;
use crate::shared::error::AppError;

/// A product's slot in a bundle together with its share of the bundle price.
///
/// Maps to the `bundle_items` table:
/// - bundle_id: UUID NOT NULL REFERENCES bundles(id)
/// - product_id: UUID NOT NULL REFERENCES products(id)
/// - distributed_price: NUMERIC(12,2) NOT NULL CHECK (distributed_price >= 0)
/// - position: INT NOT NULL
/// - PRIMARY KEY (bundle_id, product_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItem {
    pub bundle_id: Uuid,
    pub product_id: Uuid,
    pub distributed_price: Decimal,
}

/// A set of products sold together at a single price.
///
/// Maps to the `bundles` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(200) NOT NULL
/// - price: NUMERIC(12,2) NOT NULL CHECK (price >= 0)
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
///
/// `items` keeps the stored position order; the last item absorbs rounding
/// when the price is distributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub is_deleted: bool,
    pub items: Vec<BundleItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bundle {
    /// Product IDs in position order.
    pub fn product_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|i| i.product_id).collect()
    }

    /// Whether the bundle includes the given product.
    pub fn contains(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Sum of the stored per-product shares.
    pub fn distributed_total(&self) -> Decimal {
        sum_money(self.items.iter().map(|i| i.distributed_price))
    }

    /// Whether the stored shares still add up to the bundle price.
    pub fn is_distribution_consistent(&self) -> bool {
        !self.items.is_empty()
            && self.items.iter().all(|i| i.distributed_price >= Decimal::ZERO)
            && self.distributed_total() == self.price
    }

    /// Stored share for a product, if it is a member.
    pub fn share_of(&self, product_id: Uuid) -> Option<Decimal> {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.distributed_price)
    }
}

/// Repository trait for Bundle data access operations.
#[async_trait]
pub trait BundleRepository: Send + Sync {
    /// Find a bundle with its items, including soft-deleted bundles.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bundle>, AppError>;

    /// Find bundles with their items, including soft-deleted bundles.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Bundle>, AppError>;

    /// Insert a bundle together with its items.
    async fn create(&self, bundle: &Bundle) -> Result<Bundle, AppError>;

    /// Overwrite the distributed share of each listed member.
    async fn update_distribution(
        &self,
        bundle_id: Uuid,
        items: &[BundleItem],
    ) -> Result<(), AppError>;
}
