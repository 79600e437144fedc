//! Observability: tracing init.
//!
//! Uses config::ObservabilityConfig for PHASEKIT_QUIET, PHASEKIT_LOG_LEVEL and
//! PHASEKIT_LOG_JSON. `RUST_LOG`, when set, overrides the configured level.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Tracing initialization mode.
#[derive(Clone, Copy, Debug)]
pub enum TracingMode {
    /// Use PHASEKIT_LOG_LEVEL / PHASEKIT_QUIET from env
    Default,
    /// Machine-readable output on stdout: only warnings and errors reach the log
    Machine,
}

/// Initialize tracing. Call once at process startup; later calls are no-ops.
pub fn init_tracing(mode: TracingMode) {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet || matches!(mode, TracingMode::Machine) {
        "phasekit=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Logs go to stderr so plugin lists printed on stdout stay parseable.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}
