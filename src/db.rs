// SQLite store for the asset catalog
//
// One row per asset, ordered by `position` (catalog order). Every save
// replaces the full set inside a single SQL transaction, so a save is
// either fully applied or not at all, and saves land in call order.

use crate::entities::{AssetId, AssetRecord, AssetType};
use crate::error::PersistenceError;
use crate::persistence::PersistenceGateway;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One save, as recorded in the audit trail
#[derive(Debug, Clone)]
pub struct SaveEvent {
    pub saved_at: DateTime<Utc>,
    pub asset_count: usize,
}

pub fn setup_database(conn: &Connection) -> Result<(), PersistenceError> {
    // Enable WAL mode for crash recovery (in-memory databases answer "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // ==========================================================================
    // Assets Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY NOT NULL,
            position INTEGER NOT NULL,
            asset_type TEXT NOT NULL,
            value INTEGER NOT NULL CHECK (value >= 0),
            name TEXT NOT NULL,
            description TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Save Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS save_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            saved_at TEXT NOT NULL,
            asset_count INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assets_position ON assets(position)",
        [],
    )?;

    Ok(())
}

pub struct SqliteGateway {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteGateway {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        Ok(SqliteGateway {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteGateway { conn, path: None })
    }

    pub fn count(&self) -> Result<usize, PersistenceError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recent saves first
    pub fn save_history(&self, limit: usize) -> Result<Vec<SaveEvent>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT saved_at, asset_count FROM save_events ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let saved_at: String = row.get(0)?;
                let asset_count: i64 = row.get(1)?;
                Ok((saved_at, asset_count))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(saved_at, asset_count)| {
                let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                    .map_err(|e| PersistenceError::Corrupt(format!("bad save timestamp: {}", e)))?
                    .with_timezone(&Utc);
                Ok(SaveEvent {
                    saved_at,
                    asset_count: asset_count as usize,
                })
            })
            .collect()
    }
}

fn row_to_record(
    id: String,
    asset_type: String,
    value: i64,
    name: String,
    description: String,
) -> Result<AssetRecord, PersistenceError> {
    let id: AssetId = id
        .parse()
        .map_err(|e| PersistenceError::Corrupt(format!("bad asset id '{}': {}", id, e)))?;
    let asset_type: AssetType = asset_type.parse().map_err(PersistenceError::Corrupt)?;
    let value = u64::try_from(value)
        .map_err(|_| PersistenceError::Corrupt(format!("negative value {} on asset {}", value, id)))?;

    Ok(AssetRecord::from_parts(id, asset_type, value, name, description))
}

impl PersistenceGateway for SqliteGateway {
    fn load(&self) -> Result<Vec<AssetRecord>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, asset_type, value, name, description
             FROM assets
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        // A bad row is skipped on its own so the rest of the catalog still loads
        let mut records = Vec::new();
        for (position, row) in rows.enumerate() {
            let decoded = row.map_err(PersistenceError::from).and_then(
                |(id, asset_type, value, name, description)| {
                    row_to_record(id, asset_type, value, name, description)
                },
            );
            match decoded {
                Ok(record) => records.push(record),
                Err(e) => warn!(position, error = %e, "skipping unreadable asset row"),
            }
        }

        Ok(records)
    }

    fn save(&mut self, records: &[AssetRecord]) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM assets", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO assets (id, position, asset_type, value, name, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for (position, record) in records.iter().enumerate() {
                let value = i64::try_from(record.value()).map_err(|_| {
                    PersistenceError::Corrupt(format!(
                        "value {} on asset {} exceeds storage range",
                        record.value(),
                        record.id()
                    ))
                })?;

                stmt.execute(params![
                    record.id().to_string(),
                    position as i64,
                    record.asset_type().key(),
                    value,
                    record.name(),
                    record.description(),
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO save_events (saved_at, asset_count) VALUES (?1, ?2)",
            params![Utc::now().to_rfc3339(), records.len() as i64],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}
