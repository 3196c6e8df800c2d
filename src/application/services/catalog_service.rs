//! Catalog Service
//!
//! Read access to products and bundles with live pricing, plus bundle share
//! maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    distribute_bundle, sum_money, Bundle, BundleRepository, DiscountRepository,
    DistributionError, PriceCalculator, Product, ProductRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Catalog service trait
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Get a product with its current selling price
    async fn get_product(&self, product_id: Uuid) -> Result<ProductDto, CatalogError>;

    /// Get a bundle with its members and their shares
    async fn get_bundle(&self, bundle_id: Uuid) -> Result<BundleDto, CatalogError>;

    /// Recompute and persist a bundle's per-product shares
    async fn redistribute_bundle(&self, bundle_id: Uuid) -> Result<BundleDto, CatalogError>;
}

/// Product data transfer object
#[derive(Debug, Clone)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub base_game_id: Option<Uuid>,
    pub base_price: Decimal,
    pub price: Decimal,
    pub discount_percent: Option<Decimal>,
}

/// Bundle member with its share of the bundle price
#[derive(Debug, Clone)]
pub struct BundleMemberDto {
    pub product_id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub share: Decimal,
}

/// Bundle data transfer object
#[derive(Debug, Clone)]
pub struct BundleDto {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub original_total: Decimal,
    pub members: Vec<BundleMemberDto>,
}

impl BundleDto {
    fn from_parts(bundle: &Bundle, products: &[Product]) -> Self {
        let members: Vec<BundleMemberDto> = bundle
            .items
            .iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id);
                BundleMemberDto {
                    product_id: item.product_id,
                    name: product.map(|p| p.name.clone()).unwrap_or_default(),
                    base_price: product.map(|p| p.base_price).unwrap_or_default(),
                    share: item.distributed_price,
                }
            })
            .collect();

        Self {
            id: bundle.id,
            name: bundle.name.clone(),
            price: bundle.price,
            original_total: sum_money(members.iter().map(|m| m.base_price)),
            members,
        }
    }
}

/// Catalog service errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Bundle not found")]
    BundleNotFound,

    #[error("Bundle member {0} is missing from the catalog")]
    MissingMember(Uuid),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound | CatalogError::BundleNotFound => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::MissingMember(_) => AppError::Conflict(err.to_string()),
            CatalogError::Distribution(e) => AppError::BadRequest(e.to_string()),
            CatalogError::Repository(e) => e,
        }
    }
}

/// CatalogService implementation
pub struct CatalogServiceImpl<P, D, B>
where
    P: ProductRepository,
    D: DiscountRepository,
    B: BundleRepository,
{
    product_repo: Arc<P>,
    discount_repo: Arc<D>,
    bundle_repo: Arc<B>,
}

impl<P, D, B> CatalogServiceImpl<P, D, B>
where
    P: ProductRepository,
    D: DiscountRepository,
    B: BundleRepository,
{
    pub fn new(product_repo: Arc<P>, discount_repo: Arc<D>, bundle_repo: Arc<B>) -> Self {
        Self {
            product_repo,
            discount_repo,
            bundle_repo,
        }
    }

    async fn live_bundle(&self, bundle_id: Uuid) -> Result<(Bundle, Vec<Product>), CatalogError> {
        let bundle = self
            .bundle_repo
            .find_by_id(bundle_id)
            .await?
            .filter(|b| !b.is_deleted)
            .ok_or(CatalogError::BundleNotFound)?;
        let products = self.product_repo.find_by_ids(&bundle.product_ids()).await?;
        Ok((bundle, products))
    }
}

#[async_trait]
impl<P, D, B> CatalogService for CatalogServiceImpl<P, D, B>
where
    P: ProductRepository + 'static,
    D: DiscountRepository + 'static,
    B: BundleRepository + 'static,
{
    async fn get_product(&self, product_id: Uuid) -> Result<ProductDto, CatalogError> {
        let product = self
            .product_repo
            .find_by_id(product_id)
            .await?
            .filter(Product::is_available)
            .ok_or(CatalogError::ProductNotFound)?;

        let now = Utc::now();
        let discounts = self
            .discount_repo
            .find_active_for_products(&[product.id], now)
            .await?;
        let discount_percent =
            PriceCalculator::best_discount(product.id, &discounts, now).map(|d| d.percent);

        Ok(ProductDto {
            id: product.id,
            name: product.name.clone(),
            kind: product.kind.as_str().to_string(),
            base_game_id: product.base_game_id,
            base_price: product.base_price,
            price: PriceCalculator::discounted_price(&product, &discounts, now),
            discount_percent,
        })
    }

    async fn get_bundle(&self, bundle_id: Uuid) -> Result<BundleDto, CatalogError> {
        let (bundle, products) = self.live_bundle(bundle_id).await?;
        Ok(BundleDto::from_parts(&bundle, &products))
    }

    async fn redistribute_bundle(&self, bundle_id: Uuid) -> Result<BundleDto, CatalogError> {
        let (mut bundle, products) = self.live_bundle(bundle_id).await?;

        let mut members = Vec::with_capacity(bundle.items.len());
        for item in &bundle.items {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or(CatalogError::MissingMember(item.product_id))?;
            members.push((product.id, product.base_price));
        }

        let items = distribute_bundle(bundle.id, bundle.price, &members)?;
        if items != bundle.items {
            self.bundle_repo.update_distribution(bundle.id, &items).await?;
            metrics::record_bundle_redistribution("catalog");
            tracing::info!(
                target: "audit",
                bundle_id = %bundle.id,
                price = %bundle.price,
                "Bundle shares redistributed"
            );
            bundle.items = items;
        }

        Ok(BundleDto::from_parts(&bundle, &products))
    }
}
