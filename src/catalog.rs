// Asset Catalog - the owned, ordered collection of asset records
//
// Insertion order is display order. Update and remove work by id, never by
// value equality. Every successful mutation is saved through the gateway
// right away; a failed save is reported back but the in-memory change stays.

use crate::entities::{AssetId, AssetRecord, AssetType};
use crate::error::{CatalogError, PersistenceError, ValidationError};
use crate::persistence::PersistenceGateway;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Outcome of a successful mutation
#[derive(Debug)]
pub struct MutationReport {
    /// The record that was added, the replacement value, or the removed record
    pub record: AssetRecord,

    /// Set when the in-memory change could not be saved
    pub save_error: Option<PersistenceError>,
}

impl MutationReport {
    pub fn id(&self) -> AssetId {
        self.record.id()
    }

    pub fn is_persisted(&self) -> bool {
        self.save_error.is_none()
    }
}

pub struct AssetCatalog<G: PersistenceGateway> {
    records: Vec<AssetRecord>,
    gateway: G,
}

impl<G: PersistenceGateway> AssetCatalog<G> {
    /// Load the catalog from the gateway
    ///
    /// Load failures fall back to an empty catalog. Stored records that break
    /// an invariant, or repeat an id already seen, are skipped.
    pub fn load(gateway: G) -> Self {
        let stored = match gateway.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(store = %gateway.describe(), error = %e, "failed to load assets, starting empty");
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(stored.len());
        for record in stored {
            if let Err(errors) = record.validate() {
                warn!(id = %record.id(), errors = ?errors, "skipping invalid stored asset");
                continue;
            }
            if !seen.insert(record.id()) {
                warn!(id = %record.id(), "skipping stored asset with duplicate id");
                continue;
            }
            records.push(record);
        }

        info!(store = %gateway.describe(), count = records.len(), "asset catalog loaded");
        AssetCatalog { records, gateway }
    }

    /// Empty catalog that saves to `gateway` without reading from it first
    pub fn empty(gateway: G) -> Self {
        AssetCatalog {
            records: Vec::new(),
            gateway,
        }
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Append a record
    pub fn add(&mut self, record: AssetRecord) -> Result<MutationReport, CatalogError> {
        record.validate().map_err(CatalogError::Validation)?;

        if self.contains(record.id()) {
            return Err(CatalogError::Validation(vec![ValidationError::new(
                "id",
                "asset is already in the catalog",
            )]));
        }

        info!(id = %record.id(), asset_type = record.asset_type().key(), "asset added");
        self.records.push(record.clone());

        Ok(self.persist(record))
    }

    /// Replace the record with id `existing` by `updated`, in place
    ///
    /// The replacement takes over the existing id.
    pub fn update(
        &mut self,
        existing: AssetId,
        updated: AssetRecord,
    ) -> Result<MutationReport, CatalogError> {
        let index = self
            .position(existing)
            .ok_or(CatalogError::NotFound(existing))?;

        updated.validate().map_err(CatalogError::Validation)?;

        let replacement = updated.with_id(existing);
        info!(id = %existing, asset_type = replacement.asset_type().key(), "asset updated");
        self.records[index] = replacement.clone();

        Ok(self.persist(replacement))
    }

    /// Remove the record with id `id`
    pub fn remove(&mut self, id: AssetId) -> Result<MutationReport, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::NotFound(id))?;

        let removed = self.records.remove(index);
        info!(id = %id, asset_type = removed.asset_type().key(), "asset removed");

        Ok(self.persist(removed))
    }

    fn persist(&mut self, record: AssetRecord) -> MutationReport {
        let save_error = match self.gateway.save(&self.records) {
            Ok(()) => {
                debug!(store = %self.gateway.describe(), count = self.records.len(), "assets saved");
                None
            }
            Err(e) => {
                warn!(store = %self.gateway.describe(), error = %e, "failed to save assets, keeping in-memory change");
                Some(e)
            }
        };

        MutationReport { record, save_error }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Snapshot of every record of `asset_type`, in catalog order
    pub fn all_of_type(&self, asset_type: AssetType) -> Vec<AssetRecord> {
        self.records
            .iter()
            .filter(|r| r.asset_type() == asset_type)
            .cloned()
            .collect()
    }

    pub fn has_type(&self, asset_type: AssetType) -> bool {
        self.records.iter().any(|r| r.asset_type() == asset_type)
    }

    /// Distinct categories across all records
    pub fn types_present(&self) -> BTreeSet<AssetType> {
        self.records.iter().map(|r| r.asset_type()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.position(id).is_some()
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    /// Sum of values, optionally restricted to one category
    pub fn total_value(&self, asset_type: Option<AssetType>) -> u64 {
        self.records
            .iter()
            .filter(|r| asset_type.map_or(true, |t| r.asset_type() == t))
            .fold(0u64, |acc, r| acc.saturating_add(r.value()))
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    fn position(&self, id: AssetId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryGateway;

    fn laptop() -> AssetRecord {
        AssetRecord::new(AssetType::Electronics, 1200, "Laptop", "Work laptop")
    }

    fn flat() -> AssetRecord {
        AssetRecord::new(AssetType::RealEstate, 250_000, "Flat", "City centre flat")
    }

    fn catalog() -> AssetCatalog<MemoryGateway> {
        AssetCatalog::load(MemoryGateway::new())
    }

    #[test]
    fn test_add_appends_and_saves() {
        let mut catalog = catalog();
        let record = laptop();

        let report = catalog.add(record.clone()).unwrap();

        assert!(report.is_persisted());
        assert_eq!(catalog.all_of_type(AssetType::Electronics), vec![record.clone()]);
        assert_eq!(catalog.gateway().stored(), &[record]);
        assert_eq!(catalog.gateway().save_count(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_record() {
        let mut catalog = catalog();
        let record = AssetRecord::new(AssetType::None, 10, "Thing", "Stuff");

        let err = catalog.add(record).unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(catalog.is_empty());
        assert_eq!(catalog.gateway().save_count(), 0);
    }

    #[test]
    fn test_add_rejects_same_record_twice() {
        let mut catalog = catalog();
        let record = laptop();

        catalog.add(record.clone()).unwrap();
        assert!(catalog.add(record).is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_identical_fields_are_distinct_entities() {
        let mut catalog = catalog();
        let first = laptop();
        let second = laptop();

        catalog.add(first.clone()).unwrap();
        catalog.add(second.clone()).unwrap();
        catalog.remove(first.id()).unwrap();

        assert_eq!(catalog.records(), &[second]);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut catalog = catalog();
        let a = laptop();
        let b = flat();
        let c = AssetRecord::new(AssetType::Hobby, 300, "Camera", "Film camera");
        for r in [&a, &b, &c] {
            catalog.add(r.clone()).unwrap();
        }

        let changed = AssetRecord::new(AssetType::Valuables, 260_000, "Flat", "Sold soon");
        let report = catalog.update(b.id(), changed).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.records()[1].id(), b.id());
        assert_eq!(catalog.records()[1].asset_type(), AssetType::Valuables);
        assert_eq!(report.id(), b.id());
        assert!(catalog.all_of_type(AssetType::RealEstate).is_empty());
        assert_eq!(catalog.all_of_type(AssetType::Valuables).len(), 1);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut catalog = catalog();
        catalog.add(laptop()).unwrap();
        let before = catalog.records().to_vec();

        let ghost = AssetId::new();
        let err = catalog.update(ghost, flat()).unwrap_err();

        assert!(matches!(err, CatalogError::NotFound(id) if id == ghost));
        assert_eq!(catalog.records(), before.as_slice());
        assert_eq!(catalog.gateway().save_count(), 1);
    }

    #[test]
    fn test_update_rejects_invalid_replacement() {
        let mut catalog = catalog();
        let record = laptop();
        catalog.add(record.clone()).unwrap();

        let err = catalog
            .update(record.id(), AssetRecord::new(AssetType::Electronics, 1, "", "x"))
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.get(record.id()), Some(&record));
    }

    #[test]
    fn test_remove_missing_leaves_catalog_unchanged() {
        let mut catalog = catalog();
        let record = laptop();
        catalog.add(record.clone()).unwrap();

        assert!(matches!(
            catalog.remove(AssetId::new()),
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(catalog.records(), &[record]);
    }

    #[test]
    fn test_save_failure_keeps_mutation() {
        let mut catalog = catalog();
        catalog.gateway_mut().set_fail_saves(true);

        let report = catalog.add(laptop()).unwrap();

        assert!(!report.is_persisted());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.gateway().stored().is_empty());
    }

    #[test]
    fn test_load_failure_yields_empty_catalog() {
        let catalog = AssetCatalog::load(MemoryGateway::failing_loads());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_skips_invalid_and_duplicate_records() {
        let good = laptop();
        let stored = vec![
            good.clone(),
            AssetRecord::new(AssetType::None, 1, "Bad", "No type"),
            good.clone(),
        ];

        let catalog = AssetCatalog::load(MemoryGateway::with_records(stored));

        assert_eq!(catalog.records(), &[good]);
    }

    #[test]
    fn test_types_present_and_totals() {
        let mut catalog = catalog();
        catalog.add(laptop()).unwrap();
        catalog.add(laptop()).unwrap();
        catalog.add(flat()).unwrap();

        let types: Vec<AssetType> = catalog.types_present().into_iter().collect();
        assert_eq!(types, vec![AssetType::RealEstate, AssetType::Electronics]);
        assert_eq!(catalog.total_value(Some(AssetType::Electronics)), 2400);
        assert_eq!(catalog.total_value(None), 252_400);
    }

    #[test]
    fn test_all_of_type_is_a_snapshot() {
        let mut catalog = catalog();
        let record = laptop();
        catalog.add(record.clone()).unwrap();

        let snapshot = catalog.all_of_type(AssetType::Electronics);
        catalog.remove(record.id()).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(catalog.all_of_type(AssetType::Electronics).is_empty());
    }
}
