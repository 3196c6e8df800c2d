//! Cart Reconciliation
//!
//! Compares a stored cart against the live catalog and produces the minimal
//! set of changes that brings it back in line:
//!
//! - standalone lines must carry the current discount-applied price, and
//!   lines whose product is no longer sold are dropped;
//! - each bundle's lines must cover exactly the bundle's member set and add
//!   up to the bundle's price. When they do not, the bundle price is
//!   redistributed over the members by list price and the lines are aligned
//!   to the new shares. Lines of bundles that are gone are dropped.
//!
//! Planning is pure; the cart service applies the plan.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use super::bundle_pricing::distribute_bundle;
use super::pricing::PricingContext;
use crate::domain::entities::{Bundle, BundleItem, Cart, CartItem};
use crate::domain::value_objects::sum_money;

/// A line whose stored price is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub item_id: Uuid,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

/// A line the plan adds to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub product_id: Uuid,
    pub bundle_id: Option<Uuid>,
    pub price: Decimal,
}

/// Recomputed shares to write back to a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRedistribution {
    pub bundle_id: Uuid,
    pub items: Vec<BundleItem>,
}

/// Changes required to make a cart consistent with the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub price_updates: Vec<PriceUpdate>,
    pub removals: Vec<Uuid>,
    pub additions: Vec<NewCartLine>,
    pub redistributions: Vec<BundleRedistribution>,
}

impl ReconciliationPlan {
    /// An empty plan means the cart is still relevant.
    pub fn is_empty(&self) -> bool {
        self.price_updates.is_empty()
            && self.removals.is_empty()
            && self.additions.is_empty()
            && self.redistributions.is_empty()
    }

    /// Number of cart lines the plan touches.
    pub fn changed_lines(&self) -> usize {
        self.price_updates.len() + self.removals.len() + self.additions.len()
    }
}

/// Products and bundles a cart refers to, so callers can load the context.
pub fn referenced_ids(cart: &Cart) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut products: Vec<Uuid> = cart.items.iter().map(|i| i.product_id).collect();
    products.sort_unstable();
    products.dedup();
    let bundles: Vec<Uuid> = cart.bundle_groups().keys().copied().collect();
    (products, bundles)
}

/// What reconciliation does with one bundle's lines.
#[derive(Debug, Clone, PartialEq)]
enum BundleOutcome {
    /// Lines already match the bundle.
    Keep,
    /// Bundle is no longer sold; every line goes.
    Drop,
    /// Lines are re-aligned to these shares.
    Refresh(Vec<BundleItem>),
}

/// Whether a bundle can still be sold: live, non-empty, and every member
/// still on sale.
pub fn is_bundle_sellable(bundle: &Bundle, ctx: &PricingContext) -> bool {
    !bundle.is_deleted
        && !bundle.items.is_empty()
        && bundle
            .items
            .iter()
            .all(|i| ctx.current_price(i.product_id).is_some())
}

fn bundle_outcome(bundle_id: Uuid, lines: &[&CartItem], ctx: &PricingContext) -> BundleOutcome {
    let Some(bundle) = ctx.bundle(bundle_id).filter(|b| is_bundle_sellable(b, ctx)) else {
        return BundleOutcome::Drop;
    };
    if bundle_lines_match(bundle, lines) {
        return BundleOutcome::Keep;
    }
    match redistribute(bundle, ctx) {
        Some(shares) => BundleOutcome::Refresh(shares),
        None => BundleOutcome::Drop,
    }
}

/// Plan the changes that reconcile `cart` with `ctx`.
pub fn plan_reconciliation(cart: &Cart, ctx: &PricingContext) -> ReconciliationPlan {
    let mut plan = ReconciliationPlan::default();
    let groups: Vec<(Uuid, Vec<&CartItem>, BundleOutcome)> = cart
        .bundle_groups()
        .into_iter()
        .map(|(bundle_id, lines)| {
            let outcome = bundle_outcome(bundle_id, &lines, ctx);
            (bundle_id, lines, outcome)
        })
        .collect();

    // Products a bundle line covers after reconciliation. Untouched bundles
    // claim theirs before any refreshed bundle does.
    let mut bundled_products: HashSet<Uuid> = groups
        .iter()
        .filter(|(_, _, outcome)| *outcome == BundleOutcome::Keep)
        .flat_map(|(_, lines, _)| lines.iter().map(|l| l.product_id))
        .collect();

    for (bundle_id, lines, outcome) in &groups {
        let shares = match outcome {
            BundleOutcome::Keep => continue,
            BundleOutcome::Drop => {
                plan.removals.extend(lines.iter().map(|l| l.id));
                continue;
            }
            BundleOutcome::Refresh(shares) => shares,
        };

        if ctx.bundle(*bundle_id).is_some_and(|b| *shares != b.items) {
            plan.redistributions.push(BundleRedistribution {
                bundle_id: *bundle_id,
                items: shares.clone(),
            });
        }

        // A product is in the cart through one bundle at most; a refreshed
        // bundle that now overlaps another one leaves the cart whole.
        if shares.iter().any(|s| bundled_products.contains(&s.product_id)) {
            plan.removals.extend(lines.iter().map(|l| l.id));
            continue;
        }

        let targets: HashMap<Uuid, Decimal> = shares
            .iter()
            .map(|s| (s.product_id, s.distributed_price))
            .collect();
        let mut present: HashSet<Uuid> = HashSet::new();
        for line in lines {
            let Some(share) = targets.get(&line.product_id) else {
                plan.removals.push(line.id);
                continue;
            };
            if !present.insert(line.product_id) {
                plan.removals.push(line.id);
                continue;
            }
            if *share != line.price {
                plan.price_updates.push(PriceUpdate {
                    item_id: line.id,
                    old_price: line.price,
                    new_price: *share,
                });
            }
        }
        for share in shares {
            if !present.contains(&share.product_id) {
                plan.additions.push(NewCartLine {
                    product_id: share.product_id,
                    bundle_id: Some(*bundle_id),
                    price: share.distributed_price,
                });
            }
        }
        bundled_products.extend(shares.iter().map(|s| s.product_id));
    }

    let mut seen: HashSet<Uuid> = HashSet::new();
    for line in cart.standalone_items() {
        // A bundle now covers this product, or it is listed twice.
        if bundled_products.contains(&line.product_id) || !seen.insert(line.product_id) {
            plan.removals.push(line.id);
            continue;
        }
        match ctx.current_price(line.product_id) {
            None => plan.removals.push(line.id),
            Some(price) if price != line.price => plan.price_updates.push(PriceUpdate {
                item_id: line.id,
                old_price: line.price,
                new_price: price,
            }),
            Some(_) => {}
        }
    }

    plan
}

/// Apply a plan to a loaded cart. Returns the lines it added so the caller
/// can persist exactly those rows.
pub fn apply_plan(cart: &mut Cart, plan: &ReconciliationPlan) -> Vec<CartItem> {
    let removed: HashSet<Uuid> = plan.removals.iter().copied().collect();
    cart.items.retain(|i| !removed.contains(&i.id));
    for update in &plan.price_updates {
        if let Some(item) = cart.items.iter_mut().find(|i| i.id == update.item_id) {
            item.price = update.new_price;
        }
    }
    let added: Vec<CartItem> = plan
        .additions
        .iter()
        .map(|line| CartItem::new(cart.id, line.product_id, line.bundle_id, line.price))
        .collect();
    cart.items.extend(added.iter().cloned());
    added
}

fn bundle_lines_match(bundle: &Bundle, lines: &[&CartItem]) -> bool {
    let mut line_products: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let mut members = bundle.product_ids();
    line_products.sort_unstable();
    members.sort_unstable();
    line_products == members && sum_money(lines.iter().map(|l| l.price)) == bundle.price
}

/// Fresh shares weighted by the members' current list prices.
fn redistribute(bundle: &Bundle, ctx: &PricingContext) -> Option<Vec<BundleItem>> {
    let members: Option<Vec<(Uuid, Decimal)>> = bundle
        .items
        .iter()
        .map(|i| ctx.original_price(i.product_id).map(|p| (i.product_id, p)))
        .collect();
    distribute_bundle(bundle.id, bundle.price, &members?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    use crate::domain::entities::{Discount, Product, ProductKind};

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(price: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::now_v7(),
            name: "Game".into(),
            kind: ProductKind::Game,
            base_price: d(price),
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
            starts_at: Utc::now() - Duration::hours(1),
            ends_at: None,
            is_deleted: false,
        }
    }

    fn bundle(price: &str, members: &[(&Product, &str)]) -> Bundle {
        let id = Uuid::now_v7();
        let now = Utc::now();
        Bundle {
            id,
            name: "Collection".into(),
            price: d(price),
            is_deleted: false,
            items: members
                .iter()
                .map(|(p, share)| BundleItem {
                    bundle_id: id,
                    product_id: p.id,
                    distributed_price: d(share),
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn cart_with(lines: &[(Uuid, Option<Uuid>, &str)]) -> Cart {
        let mut cart = Cart::new(Uuid::now_v7());
        for (product_id, bundle_id, price) in lines {
            cart.items
                .push(CartItem::new(cart.id, *product_id, *bundle_id, d(price)));
        }
        cart
    }

    #[test]
    fn test_consistent_cart_yields_empty_plan() {
        let a = product("20.00");
        let b = product("10.00");
        let c = product("30.00");
        let bun = bundle("30.00", &[(&b, "7.50"), (&c, "22.50")]);
        let cart = cart_with(&[
            (a.id, None, "15.00"),
            (b.id, Some(bun.id), "7.50"),
            (c.id, Some(bun.id), "22.50"),
        ]);
        let ctx = PricingContext::new(
            vec![a.clone(), b, c],
            vec![discount(a.id, 25)],
            vec![bun],
            Utc::now(),
        );

        assert!(plan_reconciliation(&cart, &ctx).is_empty());
    }

    #[test]
    fn test_stale_standalone_price_is_updated() {
        let a = product("20.00");
        let cart = cart_with(&[(a.id, None, "20.00")]);
        let item_id = cart.items[0].id;
        let ctx = PricingContext::new(vec![a.clone()], vec![discount(a.id, 50)], vec![], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        assert_eq!(
            plan.price_updates,
            vec![PriceUpdate {
                item_id,
                old_price: d("20.00"),
                new_price: d("10.00"),
            }]
        );
        assert!(plan.removals.is_empty());
    }

    #[test]
    fn test_deleted_product_is_removed() {
        let mut a = product("20.00");
        a.is_deleted = true;
        let cart = cart_with(&[(a.id, None, "20.00")]);
        let ctx = PricingContext::new(vec![a], vec![], vec![], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        assert_eq!(plan.removals, vec![cart.items[0].id]);
    }

    #[test]
    fn test_bundle_price_change_redistributes() {
        let b = product("10.00");
        let c = product("30.00");
        let mut bun = bundle("30.00", &[(&b, "7.50"), (&c, "22.50")]);
        let cart = cart_with(&[(b.id, Some(bun.id), "7.50"), (c.id, Some(bun.id), "22.50")]);
        bun.price = d("20.00");
        let ctx = PricingContext::new(vec![b, c], vec![], vec![bun.clone()], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        let new_prices: Vec<Decimal> = plan.price_updates.iter().map(|u| u.new_price).collect();
        assert_eq!(new_prices, vec![d("5.00"), d("15.00")]);
        assert_eq!(plan.redistributions.len(), 1);
        assert_eq!(plan.redistributions[0].bundle_id, bun.id);

        let mut reconciled = cart.clone();
        apply_plan(&mut reconciled, &plan);
        assert_eq!(reconciled.total(), d("20.00"));
    }

    #[test]
    fn test_bundle_member_change_adds_and_removes_lines() {
        let b = product("10.00");
        let c = product("30.00");
        let e = product("20.00");
        let old = bundle("30.00", &[(&b, "7.50"), (&c, "22.50")]);
        let cart = cart_with(&[
            (b.id, Some(old.id), "7.50"),
            (c.id, Some(old.id), "22.50"),
            (e.id, None, "20.00"),
        ]);
        let b_line = cart.items[0].id;
        let c_line = cart.items[1].id;
        let e_line = cart.items[2].id;
        // b leaves the bundle and e joins it
        let mut current = bundle("30.00", &[(&c, "22.50"), (&e, "7.50")]);
        current.id = old.id;
        for item in &mut current.items {
            item.bundle_id = old.id;
        }
        let ctx = PricingContext::new(vec![b, c, e.clone()], vec![], vec![current], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        let mut removals = plan.removals.clone();
        removals.sort();
        let mut expected = vec![b_line, e_line];
        expected.sort();
        assert_eq!(removals, expected);
        assert_eq!(
            plan.price_updates,
            vec![PriceUpdate {
                item_id: c_line,
                old_price: d("22.50"),
                new_price: d("18.00"),
            }]
        );
        assert_eq!(
            plan.additions,
            vec![NewCartLine {
                product_id: e.id,
                bundle_id: Some(old.id),
                price: d("12.00"),
            }]
        );
    }

    #[test]
    fn test_deleted_bundle_lines_are_removed() {
        let b = product("10.00");
        let mut bun = bundle("8.00", &[(&b, "8.00")]);
        let cart = cart_with(&[(b.id, Some(bun.id), "8.00")]);
        bun.is_deleted = true;
        let ctx = PricingContext::new(vec![b], vec![], vec![bun], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        assert_eq!(plan.removals, vec![cart.items[0].id]);
        assert!(plan.additions.is_empty());
    }

    #[test]
    fn test_reconciled_cart_is_stable() {
        let a = product("15.00");
        let b = product("10.00");
        let c = product("30.00");
        let mut bun = bundle("30.00", &[(&b, "7.50"), (&c, "22.50")]);
        let mut cart = cart_with(&[
            (a.id, None, "15.00"),
            (b.id, Some(bun.id), "7.50"),
            (c.id, Some(bun.id), "22.50"),
        ]);
        let products = vec![a.clone(), b, c];
        let discounts = vec![discount(a.id, 10)];
        let now = Utc::now();
        bun.price = d("25.00");
        let ctx = PricingContext::new(products.clone(), discounts.clone(), vec![bun.clone()], now);

        let plan = plan_reconciliation(&cart, &ctx);
        assert!(!plan.is_empty());
        apply_plan(&mut cart, &plan);
        assert_eq!(cart.total(), d("38.50"));

        let mut refreshed = bun;
        refreshed.items = plan.redistributions[0].items.clone();
        let ctx = PricingContext::new(products, discounts, vec![refreshed], now);
        assert!(plan_reconciliation(&cart, &ctx).is_empty());
    }

    #[test]
    fn test_refreshed_bundle_overlapping_another_bundle_is_dropped() {
        let x = product("20.00");
        let y = product("20.00");
        let z = product("10.00");
        let first = bundle("30.00", &[(&x, "15.00"), (&y, "15.00")]);
        let mut second = bundle("8.00", &[(&z, "8.00")]);
        let cart = cart_with(&[
            (x.id, Some(first.id), "15.00"),
            (y.id, Some(first.id), "15.00"),
            (z.id, Some(second.id), "8.00"),
        ]);
        let z_line = cart.items[2].id;
        // x joins the second bundle while the first still holds it
        second.items.push(BundleItem {
            bundle_id: second.id,
            product_id: x.id,
            distributed_price: d("0"),
        });
        let ctx = PricingContext::new(vec![x, y, z], vec![], vec![first, second], Utc::now());

        let plan = plan_reconciliation(&cart, &ctx);
        assert_eq!(plan.removals, vec![z_line]);
        assert!(plan.additions.is_empty());
        assert!(plan.price_updates.is_empty());

        let mut reconciled = cart.clone();
        apply_plan(&mut reconciled, &plan);
        let mut products: Vec<Uuid> = reconciled.items.iter().map(|i| i.product_id).collect();
        let count = products.len();
        products.sort_unstable();
        products.dedup();
        assert_eq!(products.len(), count);
        assert_eq!(reconciled.total(), d("30.00"));
    }

    #[test]
    fn test_bundle_with_deleted_member_is_removed() {
        let x = product("20.00");
        let mut y = product("10.00");
        let bun = bundle("24.00", &[(&x, "16.00"), (&y, "8.00")]);
        let cart = cart_with(&[(x.id, Some(bun.id), "16.00"), (y.id, Some(bun.id), "8.00")]);
        y.is_deleted = true;
        let ctx = PricingContext::new(vec![x, y], vec![], vec![bun.clone()], Utc::now());

        assert!(!is_bundle_sellable(&bun, &ctx));
        let plan = plan_reconciliation(&cart, &ctx);
        let mut removals = plan.removals.clone();
        removals.sort();
        let mut expected: Vec<Uuid> = cart.items.iter().map(|i| i.id).collect();
        expected.sort();
        assert_eq!(removals, expected);
        assert!(plan.additions.is_empty());
    }
}
