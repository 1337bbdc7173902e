//! First-run seeding of the user configuration.
//!
//! The user's file is copied from the system default only when it is absent,
//! so edits are never overwritten. The copy goes through a temporary file in
//! the destination directory and is renamed into place, which keeps a failed
//! copy from leaving a truncated configuration behind.

use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::ConfigError;
use super::paths::ConfigPaths;

/// What [`ensure_user_config`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The user configuration already existed and was left untouched.
    AlreadyPresent,
    /// The system default was copied into the user configuration directory.
    Copied,
}

/// Make sure the user-writable configuration file exists.
pub fn ensure_user_config(paths: &ConfigPaths) -> Result<BootstrapOutcome, ConfigError> {
    let user_file = paths.user_config_file();
    if user_file.exists() {
        debug!(
            target: "gestured::bootstrap",
            path = %user_file.display(),
            "User configuration present"
        );
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let default_file = paths.system_config_file();
    if !default_file.is_file() {
        return Err(ConfigError::DefaultConfigMissing { path: default_file });
    }

    let bytes = fs::read(&default_file).map_err(|e| ConfigError::io(&default_file, e))?;

    let user_dir = paths.user_config_dir();
    fs::create_dir_all(user_dir).map_err(|e| ConfigError::io(user_dir, e))?;

    let mut staged = NamedTempFile::new_in(user_dir).map_err(|e| ConfigError::io(user_dir, e))?;
    staged
        .write_all(&bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| ConfigError::io(staged.path(), e))?;
    staged
        .persist(&user_file)
        .map_err(|e| ConfigError::io(&user_file, e.error))?;

    info!(
        target: "gestured::bootstrap",
        from = %default_file.display(),
        to = %user_file.display(),
        bytes = bytes.len(),
        "Copied default configuration"
    );
    Ok(BootstrapOutcome::Copied)
}
