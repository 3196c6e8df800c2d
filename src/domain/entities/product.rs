//! Product entity and repository trait.
//!
//! Maps to the `products` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Kind of catalog product matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Game,
    Addon,
}

impl ProductKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "addon" => Self::Addon,
            _ => Self::Game,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Addon => "addon",
        }
    }
}

/// A purchasable game or addon.
///
/// Maps to the `products` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(200) NOT NULL
/// - kind: VARCHAR(16) NOT NULL
/// - base_price: NUMERIC(12,2) NOT NULL CHECK (base_price >= 0)
/// - base_game_id: UUID NULL REFERENCES products(id)
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,

    pub name: String,

    pub kind: ProductKind,

    /// List price before any discount
    pub base_price: Decimal,

    /// For addons, the game they extend
    pub base_game_id: Option<Uuid>,

    /// Soft-delete flag; deleted products are not sold
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be sold.
    pub fn is_available(&self) -> bool {
        !self.is_deleted
    }
}

/// Repository trait for Product data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by ID, including soft-deleted rows.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Find all products with the given IDs, including soft-deleted rows.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError>;

    /// Insert a product.
    async fn create(&self, product: &Product) -> Result<Product, AppError>;
}
