// Asset Tracker - Core Library
// Exposes the catalog state machine for use in CLI, TUI, API server, and tests

pub mod entities;
pub mod error;
pub mod persistence;
pub mod db;
pub mod interchange;
pub mod catalog;
pub mod view;
pub mod session;
pub mod tracker;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use entities::{AssetGroup, AssetId, AssetRecord, AssetType, MAX_VALUE};
pub use error::{
    CatalogError, PersistenceError, SessionError, TrackerError, ValidationError,
};
pub use persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
pub use db::{SaveEvent, SqliteGateway};
pub use interchange::{export_csv, import_csv, read_csv, write_csv};
pub use catalog::{AssetCatalog, MutationReport};
pub use view::{CatalogView, CategoryIndicator, ViewState, DEFAULT_SLOT_CAPACITY};
pub use session::{sanitize_value, CommitOutcome, Draft, DraftField, EditSession, SessionMode};
pub use tracker::{AssetTracker, SubscriptionId, TrackerEvent};
pub use config::{Backend, DynGateway, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
