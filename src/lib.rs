#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! gestured — gesture-to-action configuration core for a gesture automation daemon.
//!
//! Loads the XML gesture configuration, seeds it from the system default on
//! first run and hot-reloads it while the daemon keeps running:
//! - `config`: home/path resolution, bootstrap, mapping, and the `Loader`.
//! - `document`: generic attributed tree parsed from the markup.
//! - `store`: the record store contract and a thread-safe implementation.
//! - `watcher`: background file watcher driving reloads.
//!
//! Use `gestured::prelude::*` to bring commonly used items into scope quickly.

/// Public module: configuration (paths, bootstrap, mapper, loader).
pub mod config;
/// Public module: generic document tree and its parser.
pub mod document;
/// Public module: gesture record store.
pub mod store;
/// Public module: configuration file watcher.
pub mod watcher;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Parse a log level name (trace|debug|info|warn|error).
pub fn parse_level(s: &str) -> Option<tracing::Level> {
    use tracing::Level;

    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize tracing (logging).
/// - `level` wins when given and valid.
/// - Otherwise honors the `RUST_LOG` environment variable as a simple level.
/// - Falls back to `info`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing(level: Option<&str>) {
    let level = level
        .and_then(parse_level)
        .or_else(|| std::env::var("RUST_LOG").ok().as_deref().and_then(parse_level))
        .unwrap_or(tracing::Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use gestured::prelude::*;`
pub mod prelude {
    pub use crate::config::{ConfigError, ConfigPaths, GestureConfigRecord, Loader};
    pub use crate::store::{GestureStore, SharedGestureStore};
    pub use crate::watcher::{ConfigWatcher, WatchError, WatchHandle};

    pub use tracing::{debug, error, info, trace, warn};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("WARNING"), Some(tracing::Level::WARN));
        assert_eq!(parse_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("loud"), None);
    }
}
