use std::ffi::OsString;
use std::path::PathBuf;

#[cfg(unix)]
use nix::unistd::{User, geteuid};
use tracing::{debug, warn};

use super::error::ConfigError;

/// Resolve the current user's home directory.
///
/// `HOME` wins when it is set and non-empty. Service managers and elevated
/// invocations often drop it, so the account database entry of the effective
/// uid is used as a fallback.
pub fn resolve_home() -> Result<PathBuf, ConfigError> {
    resolve_home_with(std::env::var_os("HOME"), lookup_account_home)
}

/// Same as [`resolve_home`] with the environment value and the account lookup
/// passed in explicitly.
pub fn resolve_home_with<F>(env_home: Option<OsString>, lookup: F) -> Result<PathBuf, ConfigError>
where
    F: FnOnce() -> Result<PathBuf, String>,
{
    if let Some(home) = env_home.filter(|h| !h.is_empty()) {
        debug!(target: "gestured::home", home = ?home, "Using HOME");
        return Ok(PathBuf::from(home));
    }

    warn!(
        target: "gestured::home",
        "HOME is not set; falling back to the account database"
    );
    lookup().map_err(|reason| ConfigError::HomeUnresolvable { reason })
}

/// Look up the home directory recorded for the effective uid.
#[cfg(unix)]
fn lookup_account_home() -> Result<PathBuf, String> {
    let uid = geteuid();
    let user = User::from_uid(uid)
        .map_err(|e| format!("account lookup for uid {uid} failed: {e}"))?
        .ok_or_else(|| format!("no account entry for uid {uid}"))?;

    if user.dir.as_os_str().is_empty() {
        return Err(format!("account '{}' has no home directory", user.name));
    }
    Ok(user.dir)
}

#[cfg(not(unix))]
fn lookup_account_home() -> Result<PathBuf, String> {
    Err("no account database on this platform".into())
}
