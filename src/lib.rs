//! # Game Store Library
//!
//! This crate provides the commerce core of a game storefront:
//! - Catalog lookups with live discount pricing
//! - Carts that stay consistent with discounts and bundle membership
//! - Checkout, payment completion and the owned-products library
//! - PostgreSQL or in-memory storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, repository traits and pure pricing services
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, in-memory and metrics implementations
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! game_store/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and services
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Repositories and metrics
//! +-- presentation/   HTTP routes and handlers
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
