//! Telemetry and Observability
//!
//! Structured logging setup. Audit events are emitted with the `audit`
//! target and can be filtered separately, e.g. `RUST_LOG=audit=info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogSettings};

/// Initialize tracing subscriber
pub fn init_tracing(settings: &LogSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }

    tracing::info!(format = ?settings.format, "Tracing initialized");
}
