//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **CatalogService**: Product and bundle lookups with live prices
//! - **CartService**: Active cart management and reconciliation
//! - **OrderService**: Checkout and payment completion
//! - **LibraryService**: Owned products

pub mod catalog_service;
pub mod cart_service;
pub mod order_service;
pub mod library_service;

// Re-export catalog service types
pub use catalog_service::{
    BundleDto, BundleMemberDto, CatalogError, CatalogService, CatalogServiceImpl, ProductDto,
};

// Re-export cart service types
pub use cart_service::{
    CartBundleDto, CartDto, CartError, CartLineDto, CartService, CartServiceImpl,
};

// Re-export order service types
pub use order_service::{
    CheckoutDto, OrderDto, OrderError, OrderItemDto, OrderService, OrderServiceImpl,
    PaymentDto, PaymentOutcome,
};

// Re-export library service types
pub use library_service::{LibraryEntryDto, LibraryError, LibraryService, LibraryServiceImpl};
