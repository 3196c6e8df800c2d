//! # Domain Services
//!
//! Domain services encapsulate business logic that doesn't naturally
//! belong to a single entity. They are pure: callers load the data and
//! persist the results.
//!
//! ## Services
//!
//! - **PriceCalculator**: Discount-applied product prices
//! - **Bundle pricing**: Distribution of a bundle price over its members
//! - **Reconciliation**: Planning the changes that bring a stale cart in line

mod bundle_pricing;
mod pricing;
mod reconciliation;

pub use bundle_pricing::*;
pub use pricing::*;
pub use reconciliation::*;
