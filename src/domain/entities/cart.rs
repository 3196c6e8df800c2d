//! Cart entity and repository trait.
//!
//! Maps to the `carts` and `cart_items` tables in the database schema.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::sum_money;
use crate::shared::error::AppError;

/// Cart lifecycle status matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
    Ordered,
}

impl CartStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ordered" => Self::Ordered,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ordered => "ordered",
        }
    }
}

/// A line in a cart. Bundle lines carry the bundle they were added through.
///
/// Maps to the `cart_items` table:
/// - id: UUID PRIMARY KEY
/// - cart_id: UUID NOT NULL REFERENCES carts(id)
/// - product_id: UUID NOT NULL REFERENCES products(id)
/// - bundle_id: UUID NULL REFERENCES bundles(id)
/// - price: NUMERIC(12,2) NOT NULL CHECK (price >= 0)
/// - added_at: TIMESTAMPTZ NOT NULL
/// - UNIQUE (cart_id, product_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub bundle_id: Option<Uuid>,
    pub price: Decimal,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(cart_id: Uuid, product_id: Uuid, bundle_id: Option<Uuid>, price: Decimal) -> Self {
        Self {
            id: Uuid::now_v7(),
            cart_id,
            product_id,
            bundle_id,
            price,
            added_at: Utc::now(),
        }
    }

    pub fn is_standalone(&self) -> bool {
        self.bundle_id.is_none()
    }
}

/// A user's shopping cart.
///
/// Maps to the `carts` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL
/// - status: VARCHAR(16) NOT NULL DEFAULT 'active'
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
/// - at most one 'active' cart per user (partial unique index)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: CartStatus,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create a new, empty active cart for a user.
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            status: CartStatus::Active,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        sum_money(self.items.iter().map(|i| i.price))
    }

    /// Whether the product is already in the cart, standalone or through a bundle.
    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    pub fn contains_bundle(&self, bundle_id: Uuid) -> bool {
        self.items.iter().any(|i| i.bundle_id == Some(bundle_id))
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn standalone_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|i| i.is_standalone())
    }

    /// Bundle lines grouped by bundle, in a stable order.
    pub fn bundle_groups(&self) -> BTreeMap<Uuid, Vec<&CartItem>> {
        let mut groups: BTreeMap<Uuid, Vec<&CartItem>> = BTreeMap::new();
        for item in &self.items {
            if let Some(bundle_id) = item.bundle_id {
                groups.entry(bundle_id).or_default().push(item);
            }
        }
        groups
    }
}

/// Repository trait for Cart data access operations.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find the user's active cart with its items.
    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, AppError>;

    /// Find a cart with its items by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cart>, AppError>;

    /// Insert an empty cart.
    async fn create(&self, cart: &Cart) -> Result<Cart, AppError>;

    /// Insert items into an existing cart.
    async fn add_items(&self, cart_id: Uuid, items: &[CartItem]) -> Result<(), AppError>;

    /// Set the price of existing items, keyed by item ID.
    async fn update_item_prices(
        &self,
        cart_id: Uuid,
        prices: &[(Uuid, Decimal)],
    ) -> Result<(), AppError>;

    /// Delete items by ID.
    async fn remove_items(&self, cart_id: Uuid, item_ids: &[Uuid]) -> Result<(), AppError>;

    /// Delete every item of the cart.
    async fn clear(&self, cart_id: Uuid) -> Result<(), AppError>;

    /// Change the cart's lifecycle status.
    async fn set_status(&self, cart_id: Uuid, status: CartStatus) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_groups_and_totals() {
        let mut cart = Cart::new(Uuid::now_v7());
        let bundle = Uuid::now_v7();
        cart.items.push(CartItem::new(cart.id, Uuid::now_v7(), None, Decimal::new(999, 2)));
        cart.items.push(CartItem::new(cart.id, Uuid::now_v7(), Some(bundle), Decimal::new(500, 2)));
        cart.items.push(CartItem::new(cart.id, Uuid::now_v7(), Some(bundle), Decimal::new(501, 2)));

        assert_eq!(cart.total(), Decimal::new(2000, 2));
        assert_eq!(cart.standalone_items().count(), 1);
        let groups = cart.bundle_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&bundle].len(), 2);
        assert!(cart.contains_bundle(bundle));
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(CartStatus::from_str("ORDERED"), CartStatus::Ordered);
        assert_eq!(CartStatus::from_str("unknown"), CartStatus::Active);
        assert_eq!(CartStatus::Ordered.as_str(), "ordered");
    }
}
