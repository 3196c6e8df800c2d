//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Cart reconciliation runs by outcome
//! - Cart mutations by action
//! - Bundle share redistributions by source
//! - Orders by resulting status
//! - Payment completions by outcome

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Cart reconciliation counter - "relevant" when nothing changed, "updated" otherwise
pub static CART_RECONCILIATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cart_reconciliations_total",
            "Number of cart reconciliation passes",
        )
        .namespace("game_store"),
        &["outcome"],
    )
    .expect("Failed to create CART_RECONCILIATIONS_TOTAL metric")
});

/// Cart mutation counter by action (add_product, add_bundle, remove_item, ...)
pub static CART_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cart_mutations_total", "Number of cart mutations").namespace("game_store"),
        &["action"],
    )
    .expect("Failed to create CART_MUTATIONS_TOTAL metric")
});

/// Bundle share rewrites by source ("catalog", "cart")
pub static BUNDLE_REDISTRIBUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bundle_redistributions_total",
            "Number of bundle share redistributions written back",
        )
        .namespace("game_store"),
        &["source"],
    )
    .expect("Failed to create BUNDLE_REDISTRIBUTIONS_TOTAL metric")
});

/// Order counter by status transition
pub static ORDERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("orders_total", "Number of orders by status").namespace("game_store"),
        &["status"],
    )
    .expect("Failed to create ORDERS_TOTAL metric")
});

/// Payment completion counter by outcome
pub static PAYMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("payments_total", "Number of completed payment attempts")
            .namespace("game_store"),
        &["outcome"],
    )
    .expect("Failed to create PAYMENTS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(CART_RECONCILIATIONS_TOTAL.clone()))
        .expect("Failed to register CART_RECONCILIATIONS_TOTAL");
    registry
        .register(Box::new(CART_MUTATIONS_TOTAL.clone()))
        .expect("Failed to register CART_MUTATIONS_TOTAL");
    registry
        .register(Box::new(BUNDLE_REDISTRIBUTIONS_TOTAL.clone()))
        .expect("Failed to register BUNDLE_REDISTRIBUTIONS_TOTAL");
    registry
        .register(Box::new(ORDERS_TOTAL.clone()))
        .expect("Failed to register ORDERS_TOTAL");
    registry
        .register(Box::new(PAYMENTS_TOTAL.clone()))
        .expect("Failed to register PAYMENTS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record the outcome of a reconciliation pass
pub fn record_reconciliation(updated: bool) {
    let outcome = if updated { "updated" } else { "relevant" };
    CART_RECONCILIATIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

/// Record a cart mutation
pub fn record_cart_mutation(action: &str) {
    CART_MUTATIONS_TOTAL.with_label_values(&[action]).inc();
}

/// Record bundle shares being rewritten
pub fn record_bundle_redistribution(source: &str) {
    BUNDLE_REDISTRIBUTIONS_TOTAL
        .with_label_values(&[source])
        .inc();
}

/// Record an order reaching a status
pub fn record_order(status: &str) {
    ORDERS_TOTAL.with_label_values(&[status]).inc();
}

/// Record a payment outcome
pub fn record_payment(succeeded: bool) {
    let outcome = if succeeded { "succeeded" } else { "failed" };
    PAYMENTS_TOTAL.with_label_values(&[outcome]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*CART_RECONCILIATIONS_TOTAL;
        let _ = &*ORDERS_TOTAL;
    }

    #[test]
    fn test_record_reconciliation() {
        record_reconciliation(true);
        let metrics = gather_metrics();
        assert!(metrics.contains("game_store_cart_reconciliations_total"));
    }

    #[test]
    fn test_record_bundle_redistribution() {
        record_bundle_redistribution("catalog");
        let metrics = gather_metrics();
        assert!(metrics.contains("game_store_bundle_redistributions_total"));
        assert!(metrics.contains("source=\"catalog\""));
    }

    #[test]
    fn test_record_order_and_payment() {
        record_order("pending");
        record_payment(false);
        let metrics = gather_metrics();
        assert!(metrics.contains("game_store_orders_total"));
        assert!(metrics.contains("game_store_payments_total"));
    }
}
