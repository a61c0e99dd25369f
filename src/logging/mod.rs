//! Tracing subscriber for the alert monitor
//!
//! Cycle events carry structured fields: `ticker`, `price` and `condition` on
//! per-rule decisions, `error` on every skipped row or failed call, and the
//! `rules`/`skipped`/`alerts`/`failures` tallies on the cycle summary. With
//! `APP_ENV=production|prod` those fields are top-level keys of one JSON object
//! per line; otherwise they are printed inline after the colored message.
//!
//! `RUST_LOG` overrides the default `info` filter. Per-request spans from the
//! metrics endpoint are logged at `debug`.

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Whether an environment name selects structured JSON logs
pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

/// Install the global tracing subscriber
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if is_production(&get_environment()) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_target(true)
                    .with_current_span(false)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    }
}
