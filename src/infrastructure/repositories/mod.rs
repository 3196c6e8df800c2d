//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **ProductRepository** - Games and addons
//! - **DiscountRepository** - Time-boxed product discounts
//! - **BundleRepository** - Bundles and their distributed price shares
//! - **CartRepository** - Active carts and cart lines
//! - **OrderRepository / PaymentRepository** - Checkout results
//! - **LibraryRepository** - Product ownership
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use game_store::infrastructure::repositories::{PgCartRepository, PgProductRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let product_repo = PgProductRepository::new(pool.clone());
//!     let cart_repo = PgCartRepository::new(pool.clone());
//! }
//! ```

pub mod product_repository;
pub mod discount_repository;
pub mod bundle_repository;
pub mod cart_repository;
pub mod order_repository;
pub mod library_repository;

pub use product_repository::PgProductRepository;
pub use discount_repository::PgDiscountRepository;
pub use bundle_repository::PgBundleRepository;
pub use cart_repository::PgCartRepository;
pub use order_repository::{PgOrderRepository, PgPaymentRepository};
pub use library_repository::PgLibraryRepository;

use crate::shared::error::AppError;

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_or_database(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    AppError::Database(e)
}

/// Map a foreign-key violation to `NotFound`, anything else to `Database`.
pub(crate) fn not_found_or_database(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(message());
        }
    }
    AppError::Database(e)
}
