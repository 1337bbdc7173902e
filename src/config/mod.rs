//! Configuration module for gestured.
//!
//! Resolves where the configuration lives, seeds it on first run, maps the
//! document onto gesture records and keeps the store current.
//!
//! Example:
//! use gestured::config::{ConfigPaths, Loader};
//! use gestured::store::SharedGestureStore;
//!
//! let mut loader = Loader::new(ConfigPaths::resolve()?, SharedGestureStore::new())?;
//! loader.load()?;

pub mod bootstrap;
pub mod error;
pub mod home;
pub mod loader;
pub mod mapper;
pub mod models;
pub mod paths;

pub use bootstrap::{BootstrapOutcome, ensure_user_config};
pub use error::ConfigError;
pub use home::{resolve_home, resolve_home_with};
pub use loader::{Loader, load_records, reload_into};
pub use mapper::{MapSummary, map_document, map_into};
pub use models::{ALL_APPLICATIONS, ActionSettings, GestureConfigRecord};
pub use paths::{CONFIG_FILE, ConfigPaths, HOME_CONFIG_DIR, SYSTEM_CONFIG_DIR};

/// Generate the JSON Schema of a gesture record (for tooling consuming record dumps).
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(GestureConfigRecord)
}
