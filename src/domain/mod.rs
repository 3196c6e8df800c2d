//! # Domain Layer
//!
//! The domain layer contains the core business logic of the store.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (Product, Bundle, Cart, Order, etc.)
//! - **value_objects**: Immutable value types (money helpers)
//! - **services**: Pricing, bundle distribution and cart reconciliation
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Pricing rules are pure functions over loaded data

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
