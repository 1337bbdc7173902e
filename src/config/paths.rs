use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::home;

/// Directory, relative to the home directory, holding the user's copy.
pub const HOME_CONFIG_DIR: &str = ".config/gestured";
/// Installation directory of the system-wide default configuration.
pub const SYSTEM_CONFIG_DIR: &str = "/usr/share/gestured";
/// File name shared by the default and the user configuration.
pub const CONFIG_FILE: &str = "gestured.conf";

/// Locations of the system default and the user-writable configuration.
///
/// Built once at startup and handed to the bootstrap, loader and watcher so
/// none of them reads global state on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    home: PathBuf,
    user_config_dir: PathBuf,
    system_config_dir: PathBuf,
}

impl ConfigPaths {
    /// Paths rooted at an explicit home directory, with the default install location.
    pub fn for_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            user_config_dir: home.join(HOME_CONFIG_DIR),
            home,
            system_config_dir: PathBuf::from(SYSTEM_CONFIG_DIR),
        }
    }

    /// Paths rooted at the resolved home directory of the current user.
    pub fn resolve() -> Result<Self, ConfigError> {
        home::resolve_home().map(Self::for_home)
    }

    /// Override where the system default configuration is installed.
    #[must_use]
    pub fn with_system_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.system_config_dir = dir.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn user_config_dir(&self) -> &Path {
        &self.user_config_dir
    }

    pub fn system_config_dir(&self) -> &Path {
        &self.system_config_dir
    }

    /// `<home>/.config/gestured/gestured.conf`
    pub fn user_config_file(&self) -> PathBuf {
        self.user_config_dir.join(CONFIG_FILE)
    }

    /// `<system dir>/gestured.conf`
    pub fn system_config_file(&self) -> PathBuf {
        self.system_config_dir.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_file_lives_under_hidden_config_dir() {
        let paths = ConfigPaths::for_home("/home/bob");
        assert_eq!(
            paths.user_config_file(),
            PathBuf::from("/home/bob/.config/gestured/gestured.conf")
        );
        assert_eq!(
            paths.system_config_file(),
            PathBuf::from("/usr/share/gestured/gestured.conf")
        );
    }

    #[test]
    fn system_dir_can_be_overridden() {
        let paths = ConfigPaths::for_home("/h").with_system_config_dir("/opt/share");
        assert_eq!(paths.system_config_file(), PathBuf::from("/opt/share/gestured.conf"));
        assert_eq!(paths.home(), Path::new("/h"));
    }
}
