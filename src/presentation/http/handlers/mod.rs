//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod cart;
pub mod catalog;
pub mod health;
pub mod library;
pub mod order;
