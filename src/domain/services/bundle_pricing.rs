//! Bundle Price Distribution
//!
//! Splits a bundle's price over its member products in proportion to their
//! list prices. Shares are rounded to the money scale and the last member
//! absorbs the rounding remainder, so the shares always add up to the
//! bundle price exactly.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::BundleItem;
use crate::domain::value_objects::{round_money, sum_money};

/// Errors raised while distributing a bundle price.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributionError {
    #[error("Bundle has no members")]
    NoMembers,

    #[error("Bundle price must not be negative")]
    NegativePrice,

    #[error("Member {0} has a negative list price")]
    NegativeMemberPrice(Uuid),
}

/// Distribute `bundle_price` over `members`, given as `(product_id, list_price)`
/// in position order. Returns `(product_id, share)` in the same order.
pub fn distribute(
    bundle_price: Decimal,
    members: &[(Uuid, Decimal)],
) -> Result<Vec<(Uuid, Decimal)>, DistributionError> {
    let Some(((last_id, _), head)) = members.split_last() else {
        return Err(DistributionError::NoMembers);
    };
    if bundle_price < Decimal::ZERO {
        return Err(DistributionError::NegativePrice);
    }
    if let Some((id, _)) = members.iter().find(|(_, p)| *p < Decimal::ZERO) {
        return Err(DistributionError::NegativeMemberPrice(*id));
    }

    let bundle_price = round_money(bundle_price);
    let original_total = sum_money(members.iter().map(|(_, p)| *p));
    // Evenly split when every member is free.
    let count = Decimal::from(members.len());

    let mut shares = Vec::with_capacity(members.len());
    let mut allocated = Decimal::ZERO;
    for (id, original) in head {
        let share = if original_total.is_zero() {
            round_money(bundle_price / count)
        } else {
            round_money(bundle_price * *original / original_total)
        };
        // Rounding up many small shares must not overdraw the bundle price.
        let share = share.min(bundle_price - allocated);
        allocated += share;
        shares.push((*id, share));
    }

    shares.push((*last_id, bundle_price - allocated));

    Ok(shares)
}

/// Distribute a bundle price and shape the result as bundle items.
pub fn distribute_bundle(
    bundle_id: Uuid,
    bundle_price: Decimal,
    members: &[(Uuid, Decimal)],
) -> Result<Vec<BundleItem>, DistributionError> {
    Ok(distribute(bundle_price, members)?
        .into_iter()
        .map(|(product_id, distributed_price)| BundleItem {
            bundle_id,
            product_id,
            distributed_price,
        })
        .collect())
}
