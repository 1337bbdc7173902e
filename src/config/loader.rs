use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::bootstrap::{self, BootstrapOutcome};
use super::error::ConfigError;
use super::mapper::{self, MapSummary};
use super::models::GestureConfigRecord;
use super::paths::ConfigPaths;
use crate::document;
use crate::store::{GestureStore, SharedGestureStore};
use crate::watcher::{ConfigWatcher, WatchHandle};

/// Parse the document at `path` and map it into a fresh list of records.
pub fn load_records(path: &Path) -> Result<(Vec<GestureConfigRecord>, MapSummary), ConfigError> {
    let root = document::parse_file(path)?;
    Ok(mapper::map_document(&root))
}

/// Reparse `path` and swap the result into `store`.
///
/// The store is only touched when parsing succeeds; on error the previous
/// records stay active.
pub fn reload_into<S: GestureStore + ?Sized>(path: &Path, store: &mut S) -> Result<MapSummary, ConfigError> {
    let (records, summary) = load_records(path)?;
    store.replace_all(records);
    Ok(summary)
}

/// Loads the gesture configuration into a store and keeps it current.
///
/// Construction seeds the user configuration from the system default when
/// needed. [`Loader::load`] performs the first load and starts hot-reload.
pub struct Loader {
    paths: ConfigPaths,
    config_path: PathBuf,
    store: SharedGestureStore,
    bootstrap: BootstrapOutcome,
    watch: Option<WatchHandle>,
}

impl Loader {
    pub fn new(paths: ConfigPaths, store: SharedGestureStore) -> Result<Self, ConfigError> {
        let bootstrap = bootstrap::ensure_user_config(&paths)?;
        let config_path = paths.user_config_file();
        Ok(Self {
            paths,
            config_path,
            store,
            bootstrap,
            watch: None,
        })
    }

    /// Load the configuration once, then watch it for changes.
    ///
    /// Parse errors here are fatal: there is no previous configuration to
    /// fall back to. Failing to set up the watcher only disables hot-reload.
    /// Returns the number of records loaded.
    pub fn load(&mut self) -> Result<usize, ConfigError> {
        let summary = reload_into(&self.config_path, &mut self.store)?;
        info!(
            target: "gestured::loader",
            path = %self.config_path.display(),
            records = summary.records,
            skipped = summary.skipped_gestures,
            "Configuration loaded"
        );

        if self.watch.is_none() {
            self.start_watching();
        }
        Ok(summary.records)
    }

    /// Reparse the configuration file, keeping the active records on failure.
    pub fn reload(&self) -> Result<MapSummary, ConfigError> {
        reload_with_fallback(&self.config_path, &mut self.store.clone())
    }

    /// Stop hot-reload and wait for the watch task to exit.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.watch.take() {
            handle.shutdown().await;
        }
    }

    pub fn hot_reload_enabled(&self) -> bool {
        self.watch.as_ref().is_some_and(WatchHandle::is_running)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn store(&self) -> &SharedGestureStore {
        &self.store
    }

    /// Whether construction copied the system default into place.
    pub fn bootstrapped(&self) -> bool {
        self.bootstrap == BootstrapOutcome::Copied
    }

    fn start_watching(&mut self) {
        let path = self.config_path.clone();
        let store = self.store.clone();
        let on_change = move || {
            let _ = reload_with_fallback(&path, &mut store.clone());
        };

        match ConfigWatcher::spawn(&self.config_path, on_change) {
            Ok(handle) => self.watch = Some(handle),
            Err(e) => warn!(
                target: "gestured::loader",
                error = %e,
                "It was not possible to monitor your configuration file for changes. \
                 Restart the daemon to apply configuration changes"
            ),
        }
    }
}

fn reload_with_fallback(path: &Path, store: &mut SharedGestureStore) -> Result<MapSummary, ConfigError> {
    match reload_into(path, store) {
        Ok(summary) => {
            debug!(
                target: "gestured::loader",
                records = summary.records,
                "Configuration reloaded"
            );
            Ok(summary)
        }
        Err(e) => {
            error!(
                target: "gestured::loader",
                error = %e,
                "Reload failed; keeping the previous configuration"
            );
            Err(e)
        }
    }
}
