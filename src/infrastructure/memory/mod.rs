//! In-Memory Repositories
//!
//! `DashMap`-backed implementations of the domain repository traits. Used by
//! the `memory` storage backend for local runs and by the test suites.
//!
//! All repositories share one [`MemoryStore`]; cloning a repository clones the
//! handle, not the data.

mod catalog;
mod commerce;

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Bundle, Cart, Discount, LibraryEntry, Order, Payment, Product};

pub use catalog::{MemoryBundleRepository, MemoryDiscountRepository, MemoryProductRepository};
pub use commerce::{
    MemoryCartRepository, MemoryLibraryRepository, MemoryOrderRepository, MemoryPaymentRepository,
};

/// Shared storage behind every in-memory repository.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) products: DashMap<Uuid, Product>,
    pub(crate) discounts: DashMap<Uuid, Discount>,
    pub(crate) bundles: DashMap<Uuid, Bundle>,
    pub(crate) carts: DashMap<Uuid, Cart>,
    pub(crate) orders: DashMap<Uuid, Order>,
    pub(crate) payments: DashMap<Uuid, Payment>,
    pub(crate) library: DashMap<(Uuid, Uuid), LibraryEntry>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// One handle per repository trait over a shared store.
#[derive(Clone)]
pub struct MemoryRepositories {
    pub store: Arc<MemoryStore>,
    pub products: Arc<MemoryProductRepository>,
    pub discounts: Arc<MemoryDiscountRepository>,
    pub bundles: Arc<MemoryBundleRepository>,
    pub carts: Arc<MemoryCartRepository>,
    pub orders: Arc<MemoryOrderRepository>,
    pub payments: Arc<MemoryPaymentRepository>,
    pub library: Arc<MemoryLibraryRepository>,
}

impl MemoryRepositories {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            products: Arc::new(MemoryProductRepository::new(store.clone())),
            discounts: Arc::new(MemoryDiscountRepository::new(store.clone())),
            bundles: Arc::new(MemoryBundleRepository::new(store.clone())),
            carts: Arc::new(MemoryCartRepository::new(store.clone())),
            orders: Arc::new(MemoryOrderRepository::new(store.clone())),
            payments: Arc::new(MemoryPaymentRepository::new(store.clone())),
            library: Arc::new(MemoryLibraryRepository::new(store.clone())),
            store,
        }
    }
}

impl Default for MemoryRepositories {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}
