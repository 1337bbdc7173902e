//! Error kinds raised while resolving, bootstrapping and parsing the configuration.
//!
//! Startup code treats every variant as fatal. During a hot-reload only
//! `DocumentInvalid` can occur and it is absorbed by the loader.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error getting your home directory path: {reason}")]
    HomeUnresolvable { reason: String },

    #[error("File {} not found.\nReinstall gestured to solve this issue", path.display())]
    DefaultConfigMissing { path: PathBuf },

    #[error("Error parsing configuration file {}: {message}", path.display())]
    DocumentInvalid { path: PathBuf, message: String },

    #[error("Filesystem error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should stop a running daemon when it shows up
    /// during a reload. A bad edit only discards that reload.
    pub fn is_fatal_on_reload(&self) -> bool {
        !matches!(self, ConfigError::DocumentInvalid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_missing_message_suggests_reinstall() {
        let err = ConfigError::DefaultConfigMissing {
            path: PathBuf::from("/usr/share/gestured/gestured.conf"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/usr/share/gestured/gestured.conf"));
        assert!(msg.contains("Reinstall"));
    }

    #[test]
    fn only_document_errors_are_absorbed_on_reload() {
        let doc = ConfigError::DocumentInvalid {
            path: PathBuf::from("a.conf"),
            message: "bad".into(),
        };
        let home = ConfigError::HomeUnresolvable {
            reason: "no account".into(),
        };
        assert!(!doc.is_fatal_on_reload());
        assert!(home.is_fatal_on_reload());
    }
}
