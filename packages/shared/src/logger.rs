//! Logging setup utilities for the Hiroba chat application.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Workspace crates whose logs are enabled by the default filter.
const WORKSPACE_CRATES: [&str; 3] = ["hiroba_shared", "hiroba_server", "hiroba_client"];

/// Build the default `EnvFilter` directive used when `RUST_LOG` is not set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hiroba-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let mut directives: Vec<String> = WORKSPACE_CRATES
        .iter()
        .map(|name| format!("{}={}", name, default_log_level))
        .collect();

    let binary_target = binary_name.replace('-', "_");
    if !WORKSPACE_CRATES.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }
    directives.push(format!("tower_http={}", default_log_level));

    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use hiroba_shared::logger::setup_logger;
///
/// setup_logger("hiroba-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
