use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured root directory.
pub const ROOT_ENV_VAR: &str = "NAVD_ROOT";

const SOCKET_FILE: &str = "navd.sock";
const TAG_FILE: &str = "tags";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root directory holding the socket and the tag file
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Get the configuration file path
    /// Always uses ~/.config/navd/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("navd")
            .join("config.toml")
    }

    /// Resolve the root directory. Precedence: CLI flag, NAVD_ROOT
    /// environment variable, config file, built-in default.
    pub fn resolve_root(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(root) = flag {
            return expand_tilde(root);
        }
        if let Some(root) = std::env::var_os(ROOT_ENV_VAR) {
            return expand_tilde(Path::new(&root));
        }
        expand_tilde(&self.general.root_dir)
    }

    /// Get the Unix socket path for a resolved root
    pub fn socket_path(root: &Path) -> PathBuf {
        root.join(SOCKET_FILE)
    }

    /// Get the tag file path for a resolved root
    pub fn tag_file_path(root: &Path) -> PathBuf {
        root.join(TAG_FILE)
    }
}

fn default_root_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("navd")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_default() {
        let config = AppConfig::default();
        let root = config.resolve_root(Some(Path::new("/tmp/navd-test")));
        assert_eq!(root, PathBuf::from("/tmp/navd-test"));
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(AppConfig::default().general.log_level, "info");
    }

    #[test]
    fn test_derived_paths() {
        let root = Path::new("/tmp/navd-test");
        assert_eq!(
            AppConfig::socket_path(root),
            PathBuf::from("/tmp/navd-test/navd.sock")
        );
        assert_eq!(
            AppConfig::tag_file_path(root),
            PathBuf::from("/tmp/navd-test/tags")
        );
    }
}
