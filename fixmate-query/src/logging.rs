//! Logging setup for the adapter.
//!
//! The adapter logs through `tracing`. Installing a subscriber is left to
//! the application unless it opts into [`init`], which requires the
//! `tracing-subscriber` feature.
//!
//! # Environment Variables
//!
//! - `FIXMATE_DEBUG=true|1|yes` - Enable debug logging
//! - `FIXMATE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `FIXMATE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use fixmate_query::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "FIXMATE_DEBUG";
const LEVEL_VAR: &str = "FIXMATE_LOG_LEVEL";
const FORMAT_VAR: &str = "FIXMATE_LOG_FORMAT";

/// Check if `FIXMATE_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The level from `FIXMATE_LOG_LEVEL`.
///
/// Falls back to "debug" when `FIXMATE_DEBUG` is set, "warn" otherwise.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_VAR) {
        Ok(level) => parse_level(&level).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// The format from `FIXMATE_LOG_FORMAT`; "json" unless set otherwise.
pub fn get_log_format() -> &'static str {
    env::var(FORMAT_VAR)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install a subscriber driven by the environment variables.
///
/// Does nothing unless `FIXMATE_DEBUG` or `FIXMATE_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Install a subscriber at a fixed level, ignoring the environment.
pub fn init_with_level(level: &str) {
    install(parse_level(level).unwrap_or("debug"), get_log_format());
}

fn install(level: &'static str, format: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "fixmate={level},fixmate_query={level},fixmate_memory={level},fixmate_firestore={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match format {
                "pretty" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format, "FixMate logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO"), Some("info"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var(DEBUG_VAR);
            env::remove_var(LEVEL_VAR);
        }
        assert_eq!(get_log_level(), "warn");
        assert!(!is_debug_enabled());
    }
}
