//! In-memory catalog repositories (products, discounts, bundles).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{
    Bundle, BundleItem, BundleRepository, Discount, DiscountRepository, Product,
    ProductRepository,
};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct MemoryProductRepository {
    store: Arc<MemoryStore>,
}

impl MemoryProductRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.store.products.get(&id).map(|p| p.clone()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.store.products.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        if self.store.products.contains_key(&product.id) {
            return Err(AppError::Conflict(format!(
                "Product {} already exists",
                product.id
            )));
        }
        self.store.products.insert(product.id, product.clone());
        Ok(product.clone())
    }
}

#[derive(Clone)]
pub struct MemoryDiscountRepository {
    store: Arc<MemoryStore>,
}

impl MemoryDiscountRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DiscountRepository for MemoryDiscountRepository {
    async fn find_active_for_products(
        &self,
        product_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<Discount>, AppError> {
        Ok(self
            .store
            .discounts
            .iter()
            .filter(|d| product_ids.contains(&d.product_id) && d.is_active_at(now))
            .map(|d| d.value().clone())
            .collect())
    }

    async fn create(&self, discount: &Discount) -> Result<Discount, AppError> {
        if !self.store.products.contains_key(&discount.product_id) {
            return Err(AppError::NotFound(format!(
                "Product {} not found",
                discount.product_id
            )));
        }
        self.store.discounts.insert(discount.id, discount.clone());
        Ok(discount.clone())
    }
}

#[derive(Clone)]
pub struct MemoryBundleRepository {
    store: Arc<MemoryStore>,
}

impl MemoryBundleRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BundleRepository for MemoryBundleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bundle>, AppError> {
        Ok(self.store.bundles.get(&id).map(|b| b.clone()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Bundle>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.store.bundles.get(id).map(|b| b.clone()))
            .collect())
    }

    async fn create(&self, bundle: &Bundle) -> Result<Bundle, AppError> {
        if let Some(missing) = bundle
            .items
            .iter()
            .find(|i| !self.store.products.contains_key(&i.product_id))
        {
            return Err(AppError::NotFound(format!(
                "Product {} not found",
                missing.product_id
            )));
        }
        self.store.bundles.insert(bundle.id, bundle.clone());
        Ok(bundle.clone())
    }

    async fn update_distribution(
        &self,
        bundle_id: Uuid,
        items: &[BundleItem],
    ) -> Result<(), AppError> {
        let mut bundle = self
            .store
            .bundles
            .get_mut(&bundle_id)
            .ok_or_else(|| AppError::NotFound(format!("Bundle {} not found", bundle_id)))?;

        for update in items {
            if let Some(item) = bundle
                .items
                .iter_mut()
                .find(|i| i.product_id == update.product_id)
            {
                item.distributed_price = update.distributed_price;
            }
        }
        bundle.updated_at = Utc::now();
        Ok(())
    }
}
