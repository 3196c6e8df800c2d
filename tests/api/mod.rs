//! REST API endpoint tests

mod cart_tests;
mod catalog_tests;
mod health_tests;
mod order_tests;
