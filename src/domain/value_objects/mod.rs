//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Money**: Decimal price helpers (rounding, summing, percent-off)

mod money;

pub use money::*;
