//! Library entity and repository trait.
//!
//! Maps to the `library_entries` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Ownership of a product, granted by a paid order.
///
/// Maps to the `library_entries` table:
/// - user_id: UUID NOT NULL
/// - product_id: UUID NOT NULL REFERENCES products(id)
/// - order_id: UUID NOT NULL REFERENCES orders(id)
/// - acquired_at: TIMESTAMPTZ NOT NULL
/// - PRIMARY KEY (user_id, product_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub acquired_at: DateTime<Utc>,
}

/// Repository trait for library data access operations.
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Entries owned by a user, oldest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, AppError>;

    /// Subset of `product_ids` the user already owns.
    async fn owned_product_ids(
        &self,
        user_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>;

    /// Grant ownership; entries the user already has are left untouched.
    async fn add_entries(&self, entries: &[LibraryEntry]) -> Result<(), AppError>;
}
