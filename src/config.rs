// Settings - configuration for the asset tracker binaries
//
// Loaded from a JSON file (`asset-tracker.json` in the working directory, or
// the path in `ASSET_TRACKER_CONFIG`). Every field is optional; a missing
// file means defaults. `ASSET_TRACKER_DATA` and `ASSET_TRACKER_BACKEND`
// override the store location and kind.

use crate::db::SqliteGateway;
use crate::persistence::{JsonFileGateway, PersistenceGateway};
use crate::view::DEFAULT_SLOT_CAPACITY;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_SETTINGS_FILE: &str = "asset-tracker.json";
pub const CONFIG_ENV: &str = "ASSET_TRACKER_CONFIG";
pub const DATA_ENV: &str = "ASSET_TRACKER_DATA";
pub const BACKEND_ENV: &str = "ASSET_TRACKER_BACKEND";

/// Gateway shared by the binaries
pub type DynGateway = Box<dyn PersistenceGateway + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Json,
    Sqlite,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            other => bail!("unknown backend '{}' (expected json or sqlite)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    pub backend: Backend,
    pub slot_capacity: usize,
    pub log_filter: String,
    pub server_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: PathBuf::from("assets.json"),
            backend: Backend::Json,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            log_filter: "asset_tracker=info".to_string(),
            server_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Settings {
    /// Settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading settings file: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
        settings.validated()
    }

    /// Resolve the settings file, then apply environment overrides
    ///
    /// An explicit `ASSET_TRACKER_CONFIG` must exist; the default file is
    /// optional.
    pub fn load() -> Result<Settings> {
        let settings = match env::var_os(CONFIG_ENV) {
            Some(path) => Settings::from_file(PathBuf::from(path))?,
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Settings::from_file(DEFAULT_SETTINGS_FILE)?
            }
            None => Settings::default(),
        };

        settings.with_overrides(env::var(DATA_ENV).ok(), env::var(BACKEND_ENV).ok())
    }

    /// Apply override values (as read from the environment)
    pub fn with_overrides(mut self, data: Option<String>, backend: Option<String>) -> Result<Settings> {
        if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
            self.data_path = PathBuf::from(data);
        }
        if let Some(backend) = backend {
            self.backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", BACKEND_ENV))?;
        }
        self.validated()
    }

    fn validated(self) -> Result<Settings> {
        if self.slot_capacity == 0 {
            bail!("slot_capacity must be at least 1");
        }
        Ok(self)
    }

    /// Open the configured store
    pub fn open_gateway(&self) -> Result<DynGateway> {
        let gateway: DynGateway = match self.backend {
            Backend::Json => Box::new(JsonFileGateway::new(&self.data_path)),
            Backend::Sqlite => Box::new(
                SqliteGateway::open(&self.data_path)
                    .with_context(|| format!("Opening database {}", self.data_path.display()))?,
            ),
        };
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "slot_capacity": 4, "backend": "sqlite" }"#).unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.slot_capacity, 4);
        assert_eq!(settings.backend, Backend::Sqlite);
        assert_eq!(settings.data_path, PathBuf::from("assets.json"));
        assert_eq!(settings.log_filter, "asset_tracker=info");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "slot_capacity = 4").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Parsing settings JSON"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "slot_capacity": 0 }"#).unwrap();

        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_overrides(Some("/tmp/other.db".to_string()), Some("SQLite".to_string()))
            .unwrap();

        assert_eq!(settings.data_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(settings.backend, Backend::Sqlite);

        assert!(Settings::default()
            .with_overrides(None, Some("postgres".to_string()))
            .is_err());
    }

    #[test]
    fn test_open_gateway_per_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings {
            data_path: dir.path().join("assets.db"),
            backend: Backend::Sqlite,
            ..Settings::default()
        };
        assert!(settings.open_gateway().unwrap().describe().starts_with("sqlite:"));

        settings.backend = Backend::Json;
        settings.data_path = dir.path().join("assets.json");
        assert!(settings.open_gateway().unwrap().describe().starts_with("json:"));
    }
}
