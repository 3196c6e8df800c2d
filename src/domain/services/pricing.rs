//! Price Calculation Service
//!
//! Resolves the live, discount-applied price of catalog products.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{Bundle, Discount, Product};
use crate::domain::value_objects::apply_percent_off;

/// Computes discount-applied prices.
pub struct PriceCalculator;

impl PriceCalculator {
    /// The discount that applies to a product at `now`.
    ///
    /// When several discounts overlap the highest percentage wins.
    pub fn best_discount<'a>(
        product_id: Uuid,
        discounts: &'a [Discount],
        now: DateTime<Utc>,
    ) -> Option<&'a Discount> {
        discounts
            .iter()
            .filter(|d| d.product_id == product_id && d.is_active_at(now))
            .max_by(|a, b| a.percent.cmp(&b.percent))
    }

    /// Current selling price of a product.
    pub fn discounted_price(product: &Product, discounts: &[Discount], now: DateTime<Utc>) -> Decimal {
        match Self::best_discount(product.id, discounts, now) {
            Some(discount) => apply_percent_off(product.base_price, discount.percent),
            None => product.base_price.max(Decimal::ZERO),
        }
    }
}

/// Current selling price per product, for products still on sale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountedPrices(HashMap<Uuid, Decimal>);

impl DiscountedPrices {
    pub fn new(products: &[Product], discounts: &[Discount], now: DateTime<Utc>) -> Self {
        Self(
            products
                .iter()
                .filter(|p| p.is_available())
                .map(|p| (p.id, PriceCalculator::discounted_price(p, discounts, now)))
                .collect(),
        )
    }

    pub fn get(&self, product_id: Uuid) -> Option<Decimal> {
        self.0.get(&product_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Snapshot of everything needed to price a cart at one instant.
#[derive(Debug, Clone)]
pub struct PricingContext {
    products: HashMap<Uuid, Product>,
    prices: DiscountedPrices,
    discounts: Vec<Discount>,
    bundles: HashMap<Uuid, Bundle>,
    now: DateTime<Utc>,
}

impl PricingContext {
    pub fn new(
        products: Vec<Product>,
        discounts: Vec<Discount>,
        bundles: Vec<Bundle>,
        now: DateTime<Utc>,
    ) -> Self {
        let prices = DiscountedPrices::new(&products, &discounts, now);
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            prices,
            discounts,
            bundles: bundles.into_iter().map(|b| (b.id, b)).collect(),
            now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Product by ID, including soft-deleted ones.
    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Bundle by ID, including soft-deleted ones.
    pub fn bundle(&self, id: Uuid) -> Option<&Bundle> {
        self.bundles.get(&id)
    }

    /// Live selling price; `None` when the product is unknown or no longer sold.
    pub fn current_price(&self, product_id: Uuid) -> Option<Decimal> {
        self.prices.get(product_id)
    }

    /// Percentage of the discount applied to a product, if any.
    pub fn discount_percent(&self, product_id: Uuid) -> Option<Decimal> {
        PriceCalculator::best_discount(product_id, &self.discounts, self.now).map(|d| d.percent)
    }

    /// List price used to weight bundle shares; known even for deleted products.
    pub fn original_price(&self, product_id: Uuid) -> Option<Decimal> {
        self.products.get(&product_id).map(|p| p.base_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::entities::ProductKind;

    fn product(cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::now_v7(),
            name: "Starfall".into(),
            kind: ProductKind::Game,
            base_price: Decimal::new(cents, 2),
            base_game_id: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn discount(product_id: Uuid, percent: i64) -> Discount {
        Discount {
            id: Uuid::now_v7(),
            product_id,
            percent: Decimal::from(percent),
            starts_at: Utc::now() - Duration::days(1),
            ends_at: None,
            is_deleted: false,
        }
    }

    #[test]
    fn test_price_without_discount_is_base_price() {
        let p = product(2999);
        assert_eq!(
            PriceCalculator::discounted_price(&p, &[], Utc::now()),
            Decimal::new(2999, 2)
        );
    }

    #[test]
    fn test_highest_overlapping_discount_wins() {
        let p = product(2000);
        let discounts = vec![discount(p.id, 10), discount(p.id, 40), discount(Uuid::now_v7(), 90)];
        assert_eq!(
            PriceCalculator::discounted_price(&p, &discounts, Utc::now()),
            Decimal::new(1200, 2)
        );
    }

    #[test]
    fn test_expired_discount_is_ignored() {
        let p = product(2000);
        let mut expired = discount(p.id, 50);
        expired.ends_at = Some(Utc::now() - Duration::hours(1));
        assert_eq!(
            PriceCalculator::discounted_price(&p, &[expired], Utc::now()),
            Decimal::new(2000, 2)
        );
    }

    #[test]
    fn test_context_hides_deleted_products() {
        let mut p = product(1000);
        p.is_deleted = true;
        let id = p.id;
        let ctx = PricingContext::new(vec![p], vec![], vec![], Utc::now());
        assert_eq!(ctx.current_price(id), None);
        assert_eq!(ctx.original_price(id), Some(Decimal::new(1000, 2)));
    }

    #[test]
    fn test_discounted_prices_lookup() {
        let on_sale = product(4000);
        let mut gone = product(1500);
        gone.is_deleted = true;
        let discounts = vec![discount(on_sale.id, 25)];

        let prices = DiscountedPrices::new(&[on_sale.clone(), gone.clone()], &discounts, Utc::now());

        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get(on_sale.id), Some(Decimal::new(3000, 2)));
        assert_eq!(prices.get(gone.id), None);
    }
}
