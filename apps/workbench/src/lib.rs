//! # HPP Workbench Library
//!
//! Application layer of the costing workbench: configuration, the catalog
//! store, product editors and the actions that tie them to the database.
//!
//! ## Module Organization
//! ```text
//! hpp_workbench_lib/
//! ├── lib.rs            ◄─── You are here (startup, tracing, report)
//! ├── config.rs         ◄─── AppConfig: defaults → hpp.toml → HPP_* env
//! ├── error.rs          ◄─── ApiError returned by every action
//! ├── state/
//! │   ├── db.rs         ◄─── Database + photo storage
//! │   ├── store.rs      ◄─── CatalogStore (collections, status)
//! │   └── product_editor.rs ◄─ Product form with live costing
//! └── commands/
//!     ├── category.rs   ◄─── Category actions
//!     ├── material.rs   ◄─── Material actions
//!     ├── product.rs    ◄─── Product actions and editors
//!     ├── photo.rs      ◄─── Photo upload / order actions
//!     └── dashboard.rs  ◄─── Summary and search
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::fmt::Write as _;
use std::path::PathBuf;

use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use hpp_core::format::{format_percentage, format_rupiah};
use hpp_db::{Database, DbConfig, LocalPhotoStorage};

use config::AppConfig;
use error::ApiResult;
use state::{CatalogStore, DbState};

/// Runs the workbench once: loads the catalog and prints a report.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,hpp=debug,sqlx=warn; override with RUST_LOG         │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → hpp.toml → HPP_* environment                           │
/// │                                                                         │
/// │  3. Open Database and Photo Storage ──────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Refresh the Store ────────────────────────────────────────────────► │
/// │     • health check, then categories, materials, products                │
/// │                                                                         │
/// │  5. Print the Catalog Report ─────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting HPP Workbench");

    let config = AppConfig::load(config_path)?;
    info!(db_path = ?config.database.path, photo_dir = ?config.photos.dir, "Configuration loaded");

    let db = open(&config).await?;
    let store = CatalogStore::new();

    commands::refresh_all(&db, &store).await?;

    print!("{}", catalog_report(&store).await);

    db.inner().close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=hpp=trace` - Show trace for hpp crates only
/// - Default: `info,hpp=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hpp=debug,sqlx=warn"));

    // A second call (tests, embedding shells) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .try_init();
}

/// Opens the database and the photo storage named by `config`.
pub async fn open(config: &AppConfig) -> ApiResult<DbState> {
    let db = Database::new(DbConfig::new(config.database.path.clone())).await?;
    let storage = LocalPhotoStorage::new(config.photos.dir.clone(), config.photos.base_url.clone());

    info!("Database connected and migrations applied");
    Ok(DbState::with_local_photos(db, storage))
}

/// Plain-text summary of the store, one line per product.
pub async fn catalog_report(store: &CatalogStore) -> String {
    let summary = commands::dashboard::dashboard_summary(store).await;
    let products = store.products().await;
    let mut out = String::new();

    let _ = writeln!(out, "HPP Workbench");
    let _ = writeln!(out, "=============");
    let _ = writeln!(
        out,
        "{} categories, {} materials, {} products",
        summary.category_count, summary.material_count, summary.product_count
    );
    let _ = writeln!(
        out,
        "Average HPP {}  selling price {}  gross profit {}",
        format_rupiah(summary.average_production_cost, true),
        format_rupiah(summary.average_selling_price, true),
        format_rupiah(summary.average_gross_profit, true),
    );

    if products.is_empty() {
        let _ = writeln!(out, "\nNo products yet.");
        return out;
    }

    let _ = writeln!(out);
    for product in &products {
        if !product.has_consistent_costing() {
            warn!(id = %product.id, name = %product.name, "Stored costing differs from BoM");
        }
        let _ = writeln!(
            out,
            "{:<24} {:>3} lines  overhead {:>4}  margin {:>4}  HPP {:>14}  price {:>14}  profit {:>14}",
            product.name,
            product.bom.len(),
            format_percentage(product.overhead_percentage),
            format_percentage(product.target_margin_percentage),
            product.costing.production_cost.to_string(),
            product.costing.estimated_selling_price.to_string(),
            product.costing.gross_profit_per_unit.to_string(),
        );
    }

    out
}
