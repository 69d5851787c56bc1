// CSV import/export - moving assets in and out of spreadsheets
//
// Columns: Type, Value, Name, Description. Ids are not exported; imported
// rows become new assets with fresh ids.

use crate::entities::{AssetRecord, AssetType};
use crate::error::PersistenceError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Type")]
    asset_type: String,

    #[serde(rename = "Value")]
    value: u64,

    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Description")]
    description: String,
}

pub fn write_csv<W: Write>(writer: W, records: &[AssetRecord]) -> Result<(), PersistenceError> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(CsvRow {
            asset_type: record.asset_type().key().to_string(),
            value: record.value(),
            name: record.name().to_string(),
            description: record.description().to_string(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Parse rows into new records. Invariants are not checked here; the
/// catalog validates each record when it is added.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<AssetRecord>, PersistenceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        let row: CsvRow = result?;
        let asset_type: AssetType = row.asset_type.parse().map_err(|e| {
            // +2: header line, 1-based
            PersistenceError::Corrupt(format!("line {}: {}", index + 2, e))
        })?;

        records.push(AssetRecord::new(asset_type, row.value, &row.name, &row.description));
    }

    Ok(records)
}

pub fn export_csv(path: &Path, records: &[AssetRecord]) -> Result<(), PersistenceError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, records)
}

pub fn import_csv(path: &Path) -> Result<Vec<AssetRecord>, PersistenceError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}
