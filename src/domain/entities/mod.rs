//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the store.
//! All entities map directly to their corresponding database tables.
//!
//! ## Catalog
//!
//! - **Product**: A game or addon with its list price
//! - **Discount**: A time-boxed percentage discount on one product
//! - **Bundle**: Products sold together, with per-product price shares
//!
//! ## Commerce
//!
//! - **Cart**: A user's active selection of products and bundles
//! - **Order / Payment**: A checked-out cart and its payment attempts
//! - **LibraryEntry**: A product a user owns
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod product;
mod discount;
mod bundle;
mod cart;
mod order;
mod library;

pub use product::{Product, ProductKind, ProductRepository};
#[cfg(test)]
pub use product::MockProductRepository;

pub use discount::{Discount, DiscountRepository};

pub use bundle::{Bundle, BundleItem, BundleRepository};

pub use cart::{Cart, CartItem, CartRepository, CartStatus};

pub use order::{
    Order, OrderItem, OrderRepository, OrderStatus, Payment, PaymentRepository, PaymentStatus,
};

pub use library::{LibraryEntry, LibraryRepository};
