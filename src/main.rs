// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;

use asset_tracker::{
    export_csv, import_csv, logging, AssetId, AssetRecord, AssetTracker, AssetType, DynGateway,
    Settings, ViewState,
};

const USAGE: &str = "\
Usage:
  asset-tracker                                       open the interactive UI
  asset-tracker list [type]                           list assets (optionally one category)
  asset-tracker add <type> <value> <name> <description>
  asset-tracker delete <id>
  asset-tracker types                                 list categories
  asset-tracker export <file.csv>
  asset-tracker import <file.csv>";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let settings = Settings::load()?;

    match args.first().map(String::as_str) {
        None => run_ui_mode(&settings),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some("types") => {
            print_types();
            Ok(())
        }
        Some(command) => {
            logging::init_stderr(&settings.log_filter)?;
            let mut tracker = open_tracker(&settings)?;
            run_command(&mut tracker, command, &args[1..])
        }
    }
}

fn open_tracker(settings: &Settings) -> Result<AssetTracker<DynGateway>> {
    let gateway = settings.open_gateway()?;
    Ok(AssetTracker::open(gateway, settings.slot_capacity))
}

fn run_command(tracker: &mut AssetTracker<DynGateway>, command: &str, rest: &[String]) -> Result<()> {
    match (command, rest) {
        ("list", []) => list_all(tracker),
        ("list", [asset_type]) => list_type(tracker, parse_type(asset_type)?),
        ("add", [asset_type, value, name, description]) => {
            let value: u64 = value
                .parse()
                .with_context(|| format!("'{}' is not a whole, non-negative amount", value))?;
            let record = AssetRecord::new(parse_type(asset_type)?, value, name, description);
            let report = tracker.add_record(record)?;
            println!("✓ Added {} ({})", report.record.name(), report.id());
            warn_if_unsaved(report.save_error.as_ref());
        }
        ("delete", [id]) => {
            let id: AssetId = id.parse().with_context(|| format!("'{}' is not an asset id", id))?;
            let report = tracker.delete_record(id)?;
            println!("✓ Deleted {} ({})", report.record.name(), report.id());
            warn_if_unsaved(report.save_error.as_ref());
        }
        ("export", [path]) => {
            export_csv(Path::new(path), tracker.catalog().records())
                .with_context(|| format!("Exporting to {}", path))?;
            println!("✓ Exported {} assets to {}", tracker.catalog().len(), path);
        }
        ("import", [path]) => import(tracker, Path::new(path))?,
        _ => bail!("unrecognised command\n\n{}", USAGE),
    }

    Ok(())
}

fn parse_type(raw: &str) -> Result<AssetType> {
    match raw.parse::<AssetType>() {
        Ok(AssetType::None) => bail!("'None' is not a category"),
        Ok(asset_type) => Ok(asset_type),
        Err(e) => bail!("{} (run `asset-tracker types`)", e),
    }
}

fn warn_if_unsaved(error: Option<&asset_tracker::PersistenceError>) {
    if let Some(e) = error {
        eprintln!("⚠️  Change kept in memory only, save failed: {}", e);
    }
}

fn print_types() {
    for group in [asset_tracker::AssetGroup::Personal, asset_tracker::AssetGroup::Business] {
        println!("{}", group.as_str());
        for asset_type in group.types() {
            println!("  {:<22} {}", asset_type.key(), asset_type.as_str());
        }
    }
}

fn list_all(tracker: &AssetTracker<DynGateway>) {
    let catalog = tracker.catalog();
    if catalog.is_empty() {
        println!("No assets yet. Add one with `asset-tracker add`.");
        return;
    }

    for asset_type in catalog.types_present() {
        println!(
            "\n{} ({} total: ${})",
            asset_type.as_str(),
            catalog.all_of_type(asset_type).len(),
            catalog.total_value(Some(asset_type))
        );
        for record in catalog.all_of_type(asset_type) {
            print_record(&record);
        }
    }
    println!("\nTotal value: ${}", catalog.total_value(None));
}

fn list_type(tracker: &mut AssetTracker<DynGateway>, asset_type: AssetType) {
    match tracker.select_category(asset_type) {
        ViewState::Empty => println!("No assets yet."),
        ViewState::NoSelection => {}
        ViewState::SelectedButNoEntries { asset_type } => {
            println!("No {} assets.", asset_type.as_str())
        }
        ViewState::ShowingEntries {
            asset_type,
            entries,
            hidden,
        } => {
            println!("{}", asset_type.as_str());
            for record in &entries {
                print_record(record);
            }
            if hidden > 0 {
                println!("  … and {} more", hidden);
            }
        }
    }
}

fn print_record(record: &AssetRecord) {
    println!(
        "  {}  ${:<10} {:<24} {}",
        record.id(),
        record.value(),
        record.name(),
        record.description()
    );
}

fn import(tracker: &mut AssetTracker<DynGateway>, path: &Path) -> Result<()> {
    println!("📂 Loading {}...", path.display());
    let records = import_csv(path).with_context(|| format!("Importing {}", path.display()))?;

    let mut added = 0;
    let mut rejected = 0;
    for record in records {
        match tracker.add_record(record) {
            Ok(report) => {
                added += 1;
                warn_if_unsaved(report.save_error.as_ref());
            }
            Err(e) => {
                rejected += 1;
                eprintln!("❌ Skipped row: {}", e);
            }
        }
    }

    println!("✓ Imported: {} assets", added);
    if rejected > 0 {
        println!("✓ Skipped invalid rows: {}", rejected);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    logging::init_file(&settings.log_filter, Path::new("asset-tracker.log"))?;

    let tracker = open_tracker(settings)?;
    let mut app = ui::App::new(tracker);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: asset-tracker help");
    std::process::exit(1);
}
