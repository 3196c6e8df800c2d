//! Cart Service
//!
//! Owns the user's active cart. Every read reconciles the stored cart with
//! the live catalog first: standalone lines are repriced at the current
//! discounted price and bundle lines are realigned with the bundle's member
//! set and shares. Mutations keep the one-product-once invariant.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    apply_plan, distribute_bundle, plan_reconciliation, referenced_ids, sum_money, Bundle,
    BundleRepository, Cart, CartItem, CartRepository, DiscountRepository, DistributionError,
    LibraryRepository, PriceCalculator, PricingContext, Product, ProductRepository,
    ReconciliationPlan,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Cart service trait
#[async_trait]
pub trait CartService: Send + Sync {
    /// Get the user's active cart, reconciled with the catalog
    async fn get_active_cart(&self, user_id: Uuid) -> Result<CartDto, CartError>;

    /// Add a single product at its current price
    async fn add_product(&self, user_id: Uuid, product_id: Uuid) -> Result<CartDto, CartError>;

    /// Add every member of a bundle at its distributed share
    async fn add_bundle(&self, user_id: Uuid, bundle_id: Uuid) -> Result<CartDto, CartError>;

    /// Remove a line; a bundle line takes the whole bundle with it
    async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<CartDto, CartError>;

    /// Remove every line of a bundle
    async fn remove_bundle(&self, user_id: Uuid, bundle_id: Uuid) -> Result<CartDto, CartError>;

    /// Remove every line
    async fn clear_cart(&self, user_id: Uuid) -> Result<CartDto, CartError>;

    /// Whether the stored cart still matches the catalog
    async fn is_cart_relevant(&self, cart: &Cart) -> Result<bool, CartError>;

    /// Bring a cart back in line with the catalog and persist the changes
    async fn update_cart(&self, cart: Cart) -> Result<Cart, CartError>;

    /// The reconciled active cart entity, if the user has one
    async fn reconciled_cart(&self, user_id: Uuid) -> Result<Option<Cart>, CartError>;
}

/// A priced cart line
#[derive(Debug, Clone)]
pub struct CartLineDto {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub original_price: Decimal,
    pub price: Decimal,
}

/// Lines added through one bundle
#[derive(Debug, Clone)]
pub struct CartBundleDto {
    pub bundle_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub items: Vec<CartLineDto>,
}

/// Cart data transfer object
#[derive(Debug, Clone)]
pub struct CartDto {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub items: Vec<CartLineDto>,
    pub bundles: Vec<CartBundleDto>,
    pub total: Decimal,
    pub original_total: Decimal,
    pub savings: Decimal,
}

impl CartDto {
    /// View for a user without an active cart
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: None,
            user_id,
            items: Vec::new(),
            bundles: Vec::new(),
            total: Decimal::ZERO,
            original_total: Decimal::ZERO,
            savings: Decimal::ZERO,
        }
    }

    pub fn from_cart(cart: &Cart, ctx: &PricingContext) -> Self {
        let line = |item: &CartItem| CartLineDto {
            item_id: item.id,
            product_id: item.product_id,
            name: ctx
                .product(item.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            original_price: ctx.original_price(item.product_id).unwrap_or(item.price),
            price: item.price,
        };

        let items: Vec<CartLineDto> = cart.standalone_items().map(line).collect();
        let bundles: Vec<CartBundleDto> = cart
            .bundle_groups()
            .into_iter()
            .map(|(bundle_id, lines)| CartBundleDto {
                bundle_id,
                name: ctx
                    .bundle(bundle_id)
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                price: sum_money(lines.iter().map(|i| i.price)),
                items: lines.into_iter().map(line).collect(),
            })
            .collect();

        let total = cart.total();
        let original_total = sum_money(
            items
                .iter()
                .chain(bundles.iter().flat_map(|b| b.items.iter()))
                .map(|l| l.original_price),
        );

        Self {
            id: Some(cart.id),
            user_id: cart.user_id,
            items,
            bundles,
            total,
            original_total,
            savings: (original_total - total).max(Decimal::ZERO),
        }
    }
}

/// Cart service errors
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Bundle not found")]
    BundleNotFound,

    #[error("Bundle has no products")]
    EmptyBundle,

    #[error("Already owned")]
    AlreadyOwned,

    #[error("Product is already in the cart")]
    AlreadyInCart,

    #[error("Bundle is already in the cart")]
    BundleAlreadyInCart,

    #[error("No active cart")]
    CartNotFound,

    #[error("Cart item not found")]
    ItemNotFound,

    #[error("Bundle is not in the cart")]
    BundleNotInCart,

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound
            | CartError::BundleNotFound
            | CartError::CartNotFound
            | CartError::ItemNotFound
            | CartError::BundleNotInCart => AppError::NotFound(err.to_string()),
            CartError::AlreadyOwned
            | CartError::AlreadyInCart
            | CartError::BundleAlreadyInCart => AppError::Conflict(err.to_string()),
            CartError::EmptyBundle | CartError::Distribution(_) => {
                AppError::BadRequest(err.to_string())
            }
            CartError::Repository(e) => e,
        }
    }
}

/// CartService implementation
pub struct CartServiceImpl<C, P, D, B, L>
where
    C: CartRepository,
    P: ProductRepository,
    D: DiscountRepository,
    B: BundleRepository,
    L: LibraryRepository,
{
    cart_repo: Arc<C>,
    product_repo: Arc<P>,
    discount_repo: Arc<D>,
    bundle_repo: Arc<B>,
    library_repo: Arc<L>,
}

impl<C, P, D, B, L> CartServiceImpl<C, P, D, B, L>
where
    C: CartRepository,
    P: ProductRepository,
    D: DiscountRepository,
    B: BundleRepository,
    L: LibraryRepository,
{
    pub fn new(
        cart_repo: Arc<C>,
        product_repo: Arc<P>,
        discount_repo: Arc<D>,
        bundle_repo: Arc<B>,
        library_repo: Arc<L>,
    ) -> Self {
        Self {
            cart_repo,
            product_repo,
            discount_repo,
            bundle_repo,
            library_repo,
        }
    }

    /// Load the catalog slice a cart depends on, including every member of
    /// the bundles it holds.
    async fn load_context(&self, cart: &Cart) -> Result<PricingContext, CartError> {
        let (mut product_ids, bundle_ids) = referenced_ids(cart);
        let bundles = if bundle_ids.is_empty() {
            Vec::new()
        } else {
            self.bundle_repo.find_by_ids(&bundle_ids).await?
        };
        for bundle in &bundles {
            product_ids.extend(bundle.product_ids());
        }
        product_ids.sort_unstable();
        product_ids.dedup();

        let now = Utc::now();
        let products = self.product_repo.find_by_ids(&product_ids).await?;
        let discounts = self
            .discount_repo
            .find_active_for_products(&product_ids, now)
            .await?;

        Ok(PricingContext::new(products, discounts, bundles, now))
    }

    async fn persist_plan(&self, cart: &mut Cart, plan: &ReconciliationPlan) -> Result<(), CartError> {
        let added = apply_plan(cart, plan);

        if !plan.removals.is_empty() {
            self.cart_repo.remove_items(cart.id, &plan.removals).await?;
        }
        if !plan.price_updates.is_empty() {
            let prices: Vec<(Uuid, Decimal)> = plan
                .price_updates
                .iter()
                .map(|u| (u.item_id, u.new_price))
                .collect();
            self.cart_repo.update_item_prices(cart.id, &prices).await?;
        }
        if !added.is_empty() {
            self.cart_repo.add_items(cart.id, &added).await?;
        }
        for redistribution in &plan.redistributions {
            self.bundle_repo
                .update_distribution(redistribution.bundle_id, &redistribution.items)
                .await?;
            metrics::record_bundle_redistribution("cart");
        }
        Ok(())
    }

    async fn reconcile(&self, mut cart: Cart) -> Result<(Cart, PricingContext), CartError> {
        let ctx = self.load_context(&cart).await?;
        let plan = plan_reconciliation(&cart, &ctx);
        metrics::record_reconciliation(!plan.is_empty());

        if plan.is_empty() {
            return Ok((cart, ctx));
        }

        self.persist_plan(&mut cart, &plan).await?;
        tracing::info!(
            target: "audit",
            user_id = %cart.user_id,
            cart_id = %cart.id,
            price_updates = plan.price_updates.len(),
            removals = plan.removals.len(),
            additions = plan.additions.len(),
            redistributions = plan.redistributions.len(),
            "Cart reconciled with catalog"
        );
        Ok((cart, ctx))
    }

    async fn active_cart(&self, user_id: Uuid) -> Result<Option<(Cart, PricingContext)>, CartError> {
        match self.cart_repo.find_active_by_user(user_id).await? {
            Some(cart) => Ok(Some(self.reconcile(cart).await?)),
            None => Ok(None),
        }
    }

    async fn active_or_new_cart(&self, user_id: Uuid) -> Result<Cart, CartError> {
        if let Some((cart, _)) = self.active_cart(user_id).await? {
            return Ok(cart);
        }

        match self.cart_repo.create(&Cart::new(user_id)).await {
            Ok(cart) => {
                tracing::debug!(user_id = %user_id, cart_id = %cart.id, "Created active cart");
                Ok(cart)
            }
            // A concurrent request created it first.
            Err(AppError::Conflict(_)) => self
                .cart_repo
                .find_active_by_user(user_id)
                .await?
                .ok_or(CartError::CartNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn view(&self, cart: &Cart) -> Result<CartDto, CartError> {
        let ctx = self.load_context(cart).await?;
        Ok(CartDto::from_cart(cart, &ctx))
    }

    /// Shares to charge for a bundle, recomputed and stored when the stored
    /// ones do not add up to the bundle price.
    async fn consistent_shares(
        &self,
        bundle: &mut Bundle,
        products: &[Product],
    ) -> Result<(), CartError> {
        if bundle.is_distribution_consistent() {
            return Ok(());
        }

        let members = bundle
            .product_ids()
            .iter()
            .map(|id| {
                products
                    .iter()
                    .find(|p| p.id == *id)
                    .map(|p| (p.id, p.base_price))
                    .ok_or(CartError::BundleNotFound)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let items = distribute_bundle(bundle.id, bundle.price, &members)?;
        self.bundle_repo.update_distribution(bundle.id, &items).await?;
        metrics::record_bundle_redistribution("cart");
        tracing::debug!(bundle_id = %bundle.id, "Recomputed inconsistent bundle shares");
        bundle.items = items;
        Ok(())
    }

    async fn remove_lines(
        &self,
        cart: &mut Cart,
        item_ids: Vec<Uuid>,
        action: &str,
    ) -> Result<(), CartError> {
        self.cart_repo.remove_items(cart.id, &item_ids).await?;
        cart.items.retain(|i| !item_ids.contains(&i.id));
        metrics::record_cart_mutation(action);
        tracing::info!(
            target: "audit",
            user_id = %cart.user_id,
            cart_id = %cart.id,
            removed = item_ids.len(),
            action,
            "Cart lines removed"
        );
        Ok(())
    }
}

#[async_trait]
impl<C, P, D, B, L> CartService for CartServiceImpl<C, P, D, B, L>
where
    C: CartRepository + 'static,
    P: ProductRepository + 'static,
    D: DiscountRepository + 'static,
    B: BundleRepository + 'static,
    L: LibraryRepository + 'static,
{
    async fn get_active_cart(&self, user_id: Uuid) -> Result<CartDto, CartError> {
        match self.active_cart(user_id).await? {
            Some((cart, ctx)) => Ok(CartDto::from_cart(&cart, &ctx)),
            None => Ok(CartDto::empty(user_id)),
        }
    }

    async fn add_product(&self, user_id: Uuid, product_id: Uuid) -> Result<CartDto, CartError> {
        let product = self
            .product_repo
            .find_by_id(product_id)
            .await?
            .filter(Product::is_available)
            .ok_or(CartError::ProductNotFound)?;

        let owned = self
            .library_repo
            .owned_product_ids(user_id, &[product.id])
            .await?;
        if !owned.is_empty() {
            return Err(CartError::AlreadyOwned);
        }

        let mut cart = self.active_or_new_cart(user_id).await?;
        if cart.contains_product(product.id) {
            return Err(CartError::AlreadyInCart);
        }

        let now = Utc::now();
        let discounts = self
            .discount_repo
            .find_active_for_products(&[product.id], now)
            .await?;
        let price = PriceCalculator::discounted_price(&product, &discounts, now);

        let item = CartItem::new(cart.id, product.id, None, price);
        self.cart_repo
            .add_items(cart.id, std::slice::from_ref(&item))
            .await?;
        cart.items.push(item);

        metrics::record_cart_mutation("add_product");
        tracing::info!(
            target: "audit",
            user_id = %user_id,
            cart_id = %cart.id,
            product_id = %product.id,
            price = %price,
            "Product added to cart"
        );

        self.view(&cart).await
    }

    async fn add_bundle(&self, user_id: Uuid, bundle_id: Uuid) -> Result<CartDto, CartError> {
        let mut bundle = self
            .bundle_repo
            .find_by_id(bundle_id)
            .await?
            .filter(|b| !b.is_deleted)
            .ok_or(CartError::BundleNotFound)?;
        if bundle.items.is_empty() {
            return Err(CartError::EmptyBundle);
        }

        let member_ids = bundle.product_ids();
        let products = self.product_repo.find_by_ids(&member_ids).await?;
        // A bundle with a member that is no longer sold is off sale itself.
        let all_available = member_ids.iter().all(|id| {
            products
                .iter()
                .any(|p| p.id == *id && p.is_available())
        });
        if !all_available {
            return Err(CartError::BundleNotFound);
        }

        let owned: HashSet<Uuid> = self
            .library_repo
            .owned_product_ids(user_id, &member_ids)
            .await?
            .into_iter()
            .collect();
        if member_ids.iter().all(|id| owned.contains(id)) {
            return Err(CartError::AlreadyOwned);
        }

        let mut cart = self.active_or_new_cart(user_id).await?;
        if cart.contains_bundle(bundle.id) {
            return Err(CartError::BundleAlreadyInCart);
        }
        // A product may only be in the cart through one bundle.
        if cart
            .items
            .iter()
            .any(|i| i.bundle_id.is_some() && bundle.contains(i.product_id))
        {
            return Err(CartError::AlreadyInCart);
        }

        self.consistent_shares(&mut bundle, &products).await?;

        let replaced: Vec<Uuid> = cart
            .standalone_items()
            .filter(|i| bundle.contains(i.product_id))
            .map(|i| i.id)
            .collect();
        if !replaced.is_empty() {
            self.cart_repo.remove_items(cart.id, &replaced).await?;
            cart.items.retain(|i| !replaced.contains(&i.id));
        }

        let lines: Vec<CartItem> = bundle
            .items
            .iter()
            .map(|m| CartItem::new(cart.id, m.product_id, Some(bundle.id), m.distributed_price))
            .collect();
        self.cart_repo.add_items(cart.id, &lines).await?;
        cart.items.extend(lines);

        metrics::record_cart_mutation("add_bundle");
        tracing::info!(
            target: "audit",
            user_id = %user_id,
            cart_id = %cart.id,
            bundle_id = %bundle.id,
            price = %bundle.price,
            replaced = replaced.len(),
            "Bundle added to cart"
        );

        self.view(&cart).await
    }

    async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<CartDto, CartError> {
        let (mut cart, ctx) = self
            .active_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let item = cart.find_item(item_id).ok_or(CartError::ItemNotFound)?;

        let item_ids: Vec<Uuid> = match item.bundle_id {
            Some(bundle_id) => cart
                .items
                .iter()
                .filter(|i| i.bundle_id == Some(bundle_id))
                .map(|i| i.id)
                .collect(),
            None => vec![item.id],
        };

        self.remove_lines(&mut cart, item_ids, "remove_item").await?;
        Ok(CartDto::from_cart(&cart, &ctx))
    }

    async fn remove_bundle(&self, user_id: Uuid, bundle_id: Uuid) -> Result<CartDto, CartError> {
        let (mut cart, ctx) = self
            .active_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let item_ids: Vec<Uuid> = cart
            .items
            .iter()
            .filter(|i| i.bundle_id == Some(bundle_id))
            .map(|i| i.id)
            .collect();
        if item_ids.is_empty() {
            return Err(CartError::BundleNotInCart);
        }

        self.remove_lines(&mut cart, item_ids, "remove_bundle").await?;
        Ok(CartDto::from_cart(&cart, &ctx))
    }

    async fn clear_cart(&self, user_id: Uuid) -> Result<CartDto, CartError> {
        let Some(mut cart) = self.cart_repo.find_active_by_user(user_id).await? else {
            return Ok(CartDto::empty(user_id));
        };

        self.cart_repo.clear(cart.id).await?;
        let removed = cart.items.len();
        cart.items.clear();

        metrics::record_cart_mutation("clear_cart");
        tracing::info!(
            target: "audit",
            user_id = %user_id,
            cart_id = %cart.id,
            removed,
            "Cart cleared"
        );

        self.view(&cart).await
    }

    async fn is_cart_relevant(&self, cart: &Cart) -> Result<bool, CartError> {
        let ctx = self.load_context(cart).await?;
        Ok(plan_reconciliation(cart, &ctx).is_empty())
    }

    async fn update_cart(&self, cart: Cart) -> Result<Cart, CartError> {
        let (cart, _) = self.reconcile(cart).await?;
        Ok(cart)
    }

    async fn reconciled_cart(&self, user_id: Uuid) -> Result<Option<Cart>, CartError> {
        Ok(self.active_cart(user_id).await?.map(|(cart, _)| cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BundleItem, Discount, LibraryEntry, ProductKind};
    use crate::infrastructure::memory::{
        MemoryBundleRepository, MemoryCartRepository, MemoryDiscountRepository,
        MemoryLibraryRepository, MemoryProductRepository, MemoryRepositories,
    };
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    type TestCartService = CartServiceImpl<
        MemoryCartRepository,
        MemoryProductRepository,
        MemoryDiscountRepository,
        MemoryBundleRepository,
        MemoryLibraryRepository,
    >;

    fn service(repos: &MemoryRepositories) -> TestCartService {
        CartServiceImpl::new(
            repos.carts.clone(),
            repos.products.clone(),
            repos.discounts.clone(),
            repos.bundles.clone(),
            repos.library.clone(),
        )
    }

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    async fn seed_product(repos: &MemoryRepositories, name: &str, cents: i64) -> Product {
        let now = Utc::now();
        repos
            .products
            .create(&Product {
                id: Uuid::now_v7(),
                name: name.into(),
                kind: ProductKind::Game,
                base_price: money(cents),
                base_game_id: None,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    async fn seed_discount(repos: &MemoryRepositories, product_id: Uuid, percent: i64) {
        repos
            .discounts
            .create(&Discount {
                id: Uuid::now_v7(),
                product_id,
                percent: Decimal::from(percent),
                starts_at: Utc::now() - Duration::hours(1),
                ends_at: None,
                is_deleted: false,
            })
            .await
            .unwrap();
    }

    async fn seed_bundle(repos: &MemoryRepositories, cents: i64, shares: &[(Uuid, i64)]) -> Bundle {
        let id = Uuid::now_v7();
        let now = Utc::now();
        repos
            .bundles
            .create(&Bundle {
                id,
                name: "Collection".into(),
                price: money(cents),
                is_deleted: false,
                items: shares
                    .iter()
                    .map(|(product_id, share)| BundleItem {
                        bundle_id: id,
                        product_id: *product_id,
                        distributed_price: money(*share),
                    })
                    .collect(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_active_cart_without_cart_is_empty() {
        let repos = MemoryRepositories::default();
        let user = Uuid::now_v7();

        let dto = service(&repos).get_active_cart(user).await.unwrap();

        assert_eq!(dto.id, None);
        assert_eq!(dto.total, Decimal::ZERO);
        assert!(repos.carts.find_active_by_user(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_product_uses_discounted_price() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 2000).await;
        seed_discount(&repos, game.id, 25).await;
        let user = Uuid::now_v7();

        let dto = service(&repos).add_product(user, game.id).await.unwrap();

        assert_eq!(dto.items.len(), 1);
        assert_eq!(dto.items[0].price, money(1500));
        assert_eq!(dto.original_total, money(2000));
        assert_eq!(dto.savings, money(500));
    }

    #[tokio::test]
    async fn test_add_product_twice_conflicts() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 2000).await;
        let user = Uuid::now_v7();
        let service = service(&repos);

        service.add_product(user, game.id).await.unwrap();
        let err = service.add_product(user, game.id).await.unwrap_err();

        assert!(matches!(err, CartError::AlreadyInCart));
    }

    #[tokio::test]
    async fn test_add_owned_product_conflicts() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 2000).await;
        let user = Uuid::now_v7();
        repos
            .library
            .add_entries(&[LibraryEntry {
                user_id: user,
                product_id: game.id,
                order_id: Uuid::now_v7(),
                acquired_at: Utc::now(),
            }])
            .await
            .unwrap();

        let err = service(&repos).add_product(user, game.id).await.unwrap_err();

        assert!(matches!(err, CartError::AlreadyOwned));
    }

    #[tokio::test]
    async fn test_add_deleted_product_is_not_found() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Retired", 2000).await;
        repos.store.products.get_mut(&game.id).unwrap().is_deleted = true;

        let err = service(&repos)
            .add_product(Uuid::now_v7(), game.id)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::ProductNotFound));
    }

    #[tokio::test]
    async fn test_add_bundle_replaces_standalone_line() {
        let repos = MemoryRepositories::default();
        let a = seed_product(&repos, "A", 3000).await;
        let b = seed_product(&repos, "B", 1000).await;
        let bundle = seed_bundle(&repos, 3000, &[(a.id, 2250), (b.id, 750)]).await;
        let user = Uuid::now_v7();
        let service = service(&repos);

        service.add_product(user, a.id).await.unwrap();
        let dto = service.add_bundle(user, bundle.id).await.unwrap();

        assert!(dto.items.is_empty());
        assert_eq!(dto.bundles.len(), 1);
        assert_eq!(dto.bundles[0].price, money(3000));
        assert_eq!(dto.total, money(3000));
        assert_eq!(dto.savings, money(1000));
    }

    #[tokio::test]
    async fn test_add_bundle_recomputes_inconsistent_shares() {
        let repos = MemoryRepositories::default();
        let a = seed_product(&repos, "A", 3000).await;
        let b = seed_product(&repos, "B", 1000).await;
        let bundle = seed_bundle(&repos, 2000, &[(a.id, 100), (b.id, 100)]).await;

        let dto = service(&repos)
            .add_bundle(Uuid::now_v7(), bundle.id)
            .await
            .unwrap();

        let prices: Vec<Decimal> = dto.bundles[0].items.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![money(1500), money(500)]);
        let stored = repos.bundles.find_by_id(bundle.id).await.unwrap().unwrap();
        assert!(stored.is_distribution_consistent());
    }

    #[tokio::test]
    async fn test_add_fully_owned_bundle_conflicts() {
        let repos = MemoryRepositories::default();
        let a = seed_product(&repos, "A", 3000).await;
        let bundle = seed_bundle(&repos, 2000, &[(a.id, 2000)]).await;
        let user = Uuid::now_v7();
        repos
            .library
            .add_entries(&[LibraryEntry {
                user_id: user,
                product_id: a.id,
                order_id: Uuid::now_v7(),
                acquired_at: Utc::now(),
            }])
            .await
            .unwrap();

        let err = service(&repos).add_bundle(user, bundle.id).await.unwrap_err();

        assert!(matches!(err, CartError::AlreadyOwned));
    }

    #[tokio::test]
    async fn test_remove_bundle_line_removes_whole_bundle() {
        let repos = MemoryRepositories::default();
        let a = seed_product(&repos, "A", 3000).await;
        let b = seed_product(&repos, "B", 1000).await;
        let c = seed_product(&repos, "C", 500).await;
        let bundle = seed_bundle(&repos, 3000, &[(a.id, 2250), (b.id, 750)]).await;
        let user = Uuid::now_v7();
        let service = service(&repos);

        service.add_product(user, c.id).await.unwrap();
        let dto = service.add_bundle(user, bundle.id).await.unwrap();
        let line = dto.bundles[0].items[0].item_id;

        let dto = service.remove_item(user, line).await.unwrap();

        assert!(dto.bundles.is_empty());
        assert_eq!(dto.items.len(), 1);
        assert_eq!(dto.total, money(500));
    }

    #[tokio::test]
    async fn test_read_reprices_when_discount_starts() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 4000).await;
        let user = Uuid::now_v7();
        let service = service(&repos);

        service.add_product(user, game.id).await.unwrap();
        seed_discount(&repos, game.id, 50).await;
        let dto = service.get_active_cart(user).await.unwrap();

        assert_eq!(dto.items[0].price, money(2000));
        let stored = repos.carts.find_active_by_user(user).await.unwrap().unwrap();
        assert_eq!(stored.items[0].price, money(2000));
        assert!(service.is_cart_relevant(&stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_drops_deleted_products() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 4000).await;
        let user = Uuid::now_v7();
        let service = service(&repos);

        service.add_product(user, game.id).await.unwrap();
        repos.store.products.get_mut(&game.id).unwrap().is_deleted = true;

        let dto = service.get_active_cart(user).await.unwrap();

        assert!(dto.items.is_empty());
        assert_eq!(dto.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_read_realigns_bundle_after_membership_change() {
        let repos = MemoryRepositories::default();
        let a = seed_product(&repos, "A", 3000).await;
        let b = seed_product(&repos, "B", 1000).await;
        let c = seed_product(&repos, "C", 1000).await;
        let bundle = seed_bundle(&repos, 3000, &[(a.id, 2250), (b.id, 750)]).await;
        let user = Uuid::now_v7();
        let service = service(&repos);
        service.add_bundle(user, bundle.id).await.unwrap();

        repos
            .store
            .bundles
            .get_mut(&bundle.id)
            .unwrap()
            .items
            .push(BundleItem {
                bundle_id: bundle.id,
                product_id: c.id,
                distributed_price: Decimal::ZERO,
            });

        let stored = repos.carts.find_active_by_user(user).await.unwrap().unwrap();
        assert!(!service.is_cart_relevant(&stored).await.unwrap());

        let updated = service.update_cart(stored).await.unwrap();

        let mut members: Vec<Uuid> = updated.items.iter().map(|i| i.product_id).collect();
        members.sort_unstable();
        let mut expected = vec![a.id, b.id, c.id];
        expected.sort_unstable();
        assert_eq!(members, expected);
        assert_eq!(updated.total(), money(3000));

        let stored_bundle = repos.bundles.find_by_id(bundle.id).await.unwrap().unwrap();
        assert!(stored_bundle.is_distribution_consistent());
        assert!(service.is_cart_relevant(&updated).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_drops_bundle_that_grows_into_another_bundle() {
        let repos = MemoryRepositories::default();
        let x = seed_product(&repos, "X", 2000).await;
        let y = seed_product(&repos, "Y", 2000).await;
        let z = seed_product(&repos, "Z", 1000).await;
        let first = seed_bundle(&repos, 3000, &[(x.id, 1500), (y.id, 1500)]).await;
        let second = seed_bundle(&repos, 800, &[(z.id, 800)]).await;
        let user = Uuid::now_v7();
        let service = service(&repos);
        service.add_bundle(user, first.id).await.unwrap();
        service.add_bundle(user, second.id).await.unwrap();

        repos
            .store
            .bundles
            .get_mut(&second.id)
            .unwrap()
            .items
            .push(BundleItem {
                bundle_id: second.id,
                product_id: x.id,
                distributed_price: Decimal::ZERO,
            });

        let dto = service.get_active_cart(user).await.unwrap();

        assert_eq!(dto.bundles.len(), 1);
        assert_eq!(dto.bundles[0].bundle_id, first.id);
        assert_eq!(dto.total, money(3000));
        // The cart stays readable afterwards
        let again = service.get_active_cart(user).await.unwrap();
        assert_eq!(again.total, money(3000));
        service.add_product(user, z.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_bundle_with_deleted_member_is_not_found() {
        let repos = MemoryRepositories::default();
        let x = seed_product(&repos, "X", 2000).await;
        let y = seed_product(&repos, "Y", 1000).await;
        let bundle = seed_bundle(&repos, 2400, &[(x.id, 1600), (y.id, 800)]).await;
        repos.store.products.get_mut(&y.id).unwrap().is_deleted = true;
        let user = Uuid::now_v7();

        let err = service(&repos).add_bundle(user, bundle.id).await.unwrap_err();

        assert!(matches!(err, CartError::BundleNotFound));
        assert!(repos.carts.find_active_by_user(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_drops_bundle_after_member_is_deleted() {
        let repos = MemoryRepositories::default();
        let x = seed_product(&repos, "X", 2000).await;
        let y = seed_product(&repos, "Y", 1000).await;
        let bundle = seed_bundle(&repos, 2400, &[(x.id, 1600), (y.id, 800)]).await;
        let user = Uuid::now_v7();
        let service = service(&repos);
        service.add_bundle(user, bundle.id).await.unwrap();

        repos.store.products.get_mut(&y.id).unwrap().is_deleted = true;
        let dto = service.get_active_cart(user).await.unwrap();

        assert!(dto.bundles.is_empty());
        assert_eq!(dto.total, Decimal::ZERO);
        let stored = repos.carts.find_active_by_user(user).await.unwrap().unwrap();
        assert!(stored.items.iter().all(|i| i.product_id != y.id));
    }

    #[tokio::test]
    async fn test_clear_cart_keeps_cart_active() {
        let repos = MemoryRepositories::default();
        let game = seed_product(&repos, "Starfall", 4000).await;
        let user = Uuid::now_v7();
        let service = service(&repos);
        let added = service.add_product(user, game.id).await.unwrap();

        let dto = service.clear_cart(user).await.unwrap();

        assert_eq!(dto.id, added.id);
        assert!(dto.items.is_empty());
        assert_eq!(dto.total, Decimal::ZERO);
    }

    #[test]
    fn test_error_status_mapping() {
        assert!(matches!(AppError::from(CartError::AlreadyInCart), AppError::Conflict(_)));
        assert!(matches!(AppError::from(CartError::ItemNotFound), AppError::NotFound(_)));
        assert!(matches!(AppError::from(CartError::EmptyBundle), AppError::BadRequest(_)));
    }
}
