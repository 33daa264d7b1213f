use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{Result, fs::config_dir};

const FILE_NAME: &str = "userdeck.toml";

/// Shortest timeout ever applied, whatever the file says
const MIN_TIMEOUT_SECS: u64 = 1;

/// Handle to the shared core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration, serialized to TOML.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub api: ApiConfig,
}

/// Where the user directory lives and how long we wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(MIN_TIMEOUT_SECS))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(MIN_TIMEOUT_SECS))
    }
}

impl CoreConfig {
    /// Load the configuration from the userdeck config directory, writing the defaults out if
    /// no file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents).map_err(|err| {
                error!(path = %path.display(), %err, "Unreadable config");
                err.into()
            })
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            debug!(path = %path.display(), "Wrote default config");
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        Ok(())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join(FILE_NAME))
    }

    pub fn into_handle(self) -> Cfg {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg, CoreConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "[api]\nbase_url = \"https://users.example.com\"\n").unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg.api.base_url, "https://users.example.com");
        assert_eq!(cfg.api.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);

        let mut cfg = CoreConfig::default();
        cfg.api.request_timeout_secs = 3;
        cfg.save_to(&path).unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "[api\nbase_url = ").unwrap();

        assert!(matches!(
            CoreConfig::load_from(&path),
            Err(crate::Error::TomlDe(_))
        ));
    }

    #[test]
    fn test_zero_timeouts_are_clamped() {
        let api = ApiConfig {
            request_timeout_secs: 0,
            connect_timeout_secs: 0,
            ..Default::default()
        };

        assert_eq!(api.request_timeout(), Duration::from_secs(1));
        assert_eq!(api.connect_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_handle_shares_config() {
        let cfg = CoreConfig::default().into_handle();
        let other = Arc::clone(&cfg);

        other.write().api.base_url = "https://users.example.com".into();

        assert_eq!(cfg.read().api.base_url, "https://users.example.com");
    }
}
