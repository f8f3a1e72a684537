//! Small environment helpers consumed by `telemetry` to decide log
//! formatting. Kept deliberately tiny; the node has no other use for an
//! "environment" concept.

use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Remote,
}

/// Reads `NODE_ENV`; anything other than `"remote"` is treated as local.
pub fn get_environment() -> Environment {
    match env::var("NODE_ENV").as_deref() {
        Ok("remote") => Environment::Remote,
        _ => Environment::Local,
    }
}

/// Reads `NODE_LOG_PRETTY`; defaults to `true` when unset or unparsable.
pub fn get_pretty_print_logs() -> bool {
    env::var("NODE_LOG_PRETTY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(true)
}
