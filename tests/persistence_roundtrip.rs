use asset_tracker::{
    export_csv, import_csv, AssetCatalog, AssetRecord, AssetTracker, AssetType, Backend,
    CatalogError, DraftField, JsonFileGateway, PersistenceGateway, SessionError, Settings,
    SqliteGateway, TrackerError, ViewState, MAX_VALUE,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample_records() -> Vec<AssetRecord> {
    vec![
        AssetRecord::new(AssetType::RealEstate, 350_000, "Flat", "Two rooms, city centre"),
        AssetRecord::new(AssetType::Electronics, 1200, "Laptop", "Work laptop"),
        AssetRecord::new(AssetType::Electronics, 0, "Old phone", "Kept as a spare"),
        AssetRecord::new(AssetType::IntellectualProperty, 15_000, "Patent", "Hinge design, \"v2\""),
    ]
}

#[test]
fn json_store_survives_a_restart() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("assets.json");

    let records = sample_records();
    {
        let mut catalog = AssetCatalog::empty(JsonFileGateway::new(&path));
        for record in &records {
            let report = catalog.add(record.clone()).expect("add");
            assert!(report.is_persisted());
        }
    }

    let reopened = AssetCatalog::load(JsonFileGateway::new(&path));
    assert_eq!(reopened.records(), records.as_slice());
    assert!(!path.with_file_name("assets.json.tmp").exists());
}

#[test]
fn sqlite_store_survives_a_restart_in_order() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("assets.db");

    let records = sample_records();
    {
        let gateway = SqliteGateway::open(&path).expect("open db");
        let mut tracker = AssetTracker::open(gateway, 8);
        for record in &records {
            tracker.add_record(record.clone()).expect("add");
        }
        tracker.delete_record(records[0].id()).expect("delete");
    }

    let gateway = SqliteGateway::open(&path).expect("reopen db");
    assert_eq!(gateway.count().expect("count"), 3);
    assert_eq!(gateway.load().expect("load"), records[1..].to_vec());

    let history = gateway.save_history(10).expect("history");
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].asset_count, 3);
    assert_eq!(history[1].asset_count, 4);
}

#[test]
fn values_beyond_sqlite_range_never_reach_the_store() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("assets.db");

    let largest = AssetRecord::new(AssetType::FinancialAssets, MAX_VALUE, "Fund", "Index fund");
    let kite = AssetRecord::new(AssetType::Hobby, 40, "Kite", "Red kite");
    {
        let gateway = SqliteGateway::open(&path).expect("open db");
        let mut tracker = AssetTracker::open(gateway, 8);

        tracker.request_create();
        tracker
            .select_draft_type(AssetType::FinancialAssets)
            .expect("type");
        tracker.set_field(DraftField::Name, "Fund").expect("name");
        tracker
            .set_field(DraftField::Description, "Index fund")
            .expect("description");
        let can_commit = tracker
            .set_field(DraftField::Value, "10000000000000000000")
            .expect("value");
        assert!(!can_commit);
        assert!(matches!(
            tracker.commit_edit(),
            Err(TrackerError::Session(SessionError::Validation(_)))
        ));
        tracker.cancel_edit();

        let oversized = AssetRecord::new(AssetType::FinancialAssets, MAX_VALUE + 1, "Fund", "Index");
        assert!(matches!(
            tracker.add_record(oversized),
            Err(TrackerError::Catalog(CatalogError::Validation(_)))
        ));

        assert!(tracker.add_record(largest.clone()).expect("add").is_persisted());
        assert!(tracker.add_record(kite.clone()).expect("add").is_persisted());
    }

    let reopened = SqliteGateway::open(&path).expect("reopen db");
    assert_eq!(reopened.load().expect("load"), vec![largest, kite]);
}

#[test]
fn csv_export_then_import_gives_the_same_assets_with_new_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("assets.csv");

    let records = sample_records();
    export_csv(&path, &records).expect("export");
    let imported = import_csv(&path).expect("import");

    assert_eq!(imported.len(), records.len());
    for (original, copy) in records.iter().zip(&imported) {
        assert_eq!(copy.asset_type(), original.asset_type());
        assert_eq!(copy.value(), original.value());
        assert_eq!(copy.name(), original.name());
        assert_eq!(copy.description(), original.description());
        assert_ne!(copy.id(), original.id());
    }
}

#[test]
fn settings_file_selects_the_sqlite_backend() {
    let dir = TempDir::new().expect("temp dir");
    let settings_path = dir.path().join("asset-tracker.json");
    let data_path = dir.path().join("store.db");
    std::fs::write(
        &settings_path,
        serde_json::json!({
            "data_path": data_path,
            "backend": "sqlite",
            "slot_capacity": 2,
        })
        .to_string(),
    )
    .expect("write settings");

    let settings = Settings::from_file(&settings_path).expect("settings");
    assert_eq!(settings.backend, Backend::Sqlite);
    assert_eq!(settings.slot_capacity, 2);
    assert_eq!(settings.log_filter, Settings::default().log_filter);

    {
        let mut tracker = AssetTracker::open(settings.open_gateway().expect("gateway"), 2);
        for record in sample_records() {
            tracker.add_record(record).expect("add");
        }
    }

    let mut tracker = AssetTracker::open(settings.open_gateway().expect("gateway"), 2);
    match tracker.select_category(AssetType::Electronics) {
        ViewState::ShowingEntries { entries, hidden, .. } => {
            let names: Vec<&str> = entries.iter().map(|r| r.name()).collect();
            assert_eq!(names, vec!["Laptop", "Old phone"]);
            assert_eq!(hidden, 0);
        }
        other => panic!("expected entries, got {:?}", other),
    }
    assert!(data_path.exists());
}
