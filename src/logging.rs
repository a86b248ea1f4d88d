//! # Structured Logging Module
//!
//! Environment-aware console logging using the tracing ecosystem. Logs go to
//! stderr so that the completion report on stdout stays machine readable.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::ENV_PREFIX;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` takes precedence over the environment default. Safe to call
/// more than once, and tolerates a subscriber installed by someone else.
pub fn init_structured_logging() {
    init_with_level(None);
}

/// Like [`init_structured_logging`] but with an explicit default level,
/// used by the CLI's `-v` flags.
pub fn init_with_level(level: Option<&str>) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let default_level = level
            .map(str::to_string)
            .unwrap_or_else(|| get_log_level(&environment));
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level.clone()));

        let layer = if use_json_format() {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::debug!(
            environment = %environment,
            level = %default_level,
            "Structured logging initialized"
        );
    });
}

/// Current environment from `PRIMESCAN_ENV`.
fn get_environment() -> String {
    std::env::var(format!("{ENV_PREFIX}_ENV")).unwrap_or_else(|_| "development".to_string())
}

/// Default log level for an environment.
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" | "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_format() -> bool {
    std::env::var(format!("{ENV_PREFIX}_LOG_FORMAT"))
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
