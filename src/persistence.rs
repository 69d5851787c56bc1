// Persistence Gateway - load/save contract for the asset catalog
//
// The catalog only knows this trait. Concrete stores:
// - MemoryGateway   (in-process, used by tests and dry runs)
// - JsonFileGateway (single JSON document, atomic replace)
// - SqliteGateway   (see db.rs)

use crate::entities::AssetRecord;
use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Store the catalog loads from at startup and saves to after each mutation
///
/// `save` followed by `load` must return the same records with identical
/// field values and ids.
pub trait PersistenceGateway {
    /// All stored records, empty when nothing has been saved yet
    fn load(&self) -> Result<Vec<AssetRecord>, PersistenceError>;

    /// Replace the stored set with `records`
    fn save(&mut self, records: &[AssetRecord]) -> Result<(), PersistenceError>;

    /// Short human description for logs ("json:assets.json")
    fn describe(&self) -> String;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load(&self) -> Result<Vec<AssetRecord>, PersistenceError> {
        (**self).load()
    }

    fn save(&mut self, records: &[AssetRecord]) -> Result<(), PersistenceError> {
        (**self).save(records)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

// ============================================================================
// MEMORY GATEWAY
// ============================================================================

/// In-process store with failure injection
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: Vec<AssetRecord>,
    fail_loads: bool,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that already holds `records`
    pub fn with_records(records: Vec<AssetRecord>) -> Self {
        MemoryGateway {
            records,
            ..Self::default()
        }
    }

    /// Every load fails
    pub fn failing_loads() -> Self {
        MemoryGateway {
            fail_loads: true,
            ..Self::default()
        }
    }

    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// What the last successful save wrote
    pub fn stored(&self) -> &[AssetRecord] {
        &self.records
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Vec<AssetRecord>, PersistenceError> {
        if self.fail_loads {
            return Err(PersistenceError::Corrupt("memory store unavailable".to_string()));
        }
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[AssetRecord]) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory store rejected write",
            )));
        }
        self.records = records.to_vec();
        self.save_count += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// ============================================================================
// JSON FILE GATEWAY
// ============================================================================

/// On-disk document format version
pub const JSON_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    saved_at: DateTime<Utc>,
    assets: Vec<AssetRecord>,
}

/// Whole catalog in one JSON document
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-save leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileGateway { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "assets.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Result<Vec<AssetRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        let document: StoreDocument = serde_json::from_str(&raw)?;

        if document.version != JSON_FORMAT_VERSION {
            return Err(PersistenceError::Corrupt(format!(
                "unsupported document version {} in {}",
                document.version,
                self.path.display()
            )));
        }

        Ok(document.assets)
    }

    fn save(&mut self, records: &[AssetRecord]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let document = StoreDocument {
            version: JSON_FORMAT_VERSION,
            saved_at: Utc::now(),
            assets: records.to_vec(),
        };

        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_vec_pretty(&document)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
