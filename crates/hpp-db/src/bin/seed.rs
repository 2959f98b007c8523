//! # Seed Data Generator
//!
//! Populates the database with a small sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p hpp-db --bin seed
//!
//! # Specify database path
//! cargo run -p hpp-db --bin seed -- --db ./data/hpp.db
//! ```
//!
//! ## Generated Data
//! - Categories: Kain, Benang, Aksesoris
//! - Materials priced in whole Rupiah, measured in Pcs or Cm
//! - Products with a BoM built from those materials, at default overhead
//!   and margin

use std::collections::HashMap;
use std::env;

use hpp_core::format::format_rupiah;
use hpp_core::{
    BomLine, MaterialInput, ProductDraft, Unit, DEFAULT_OVERHEAD_PERCENTAGE,
    DEFAULT_TARGET_MARGIN_PERCENTAGE,
};
use hpp_db::{Database, DbConfig};

/// (category, material, standard price, unit)
const MATERIALS: &[(&str, &str, f64, Unit)] = &[
    ("Kain", "Kain Katun", 250.0, Unit::Cm),
    ("Kain", "Kain Kanvas", 400.0, Unit::Cm),
    ("Kain", "Kain Furing", 150.0, Unit::Cm),
    ("Benang", "Benang Jahit", 5_000.0, Unit::Pcs),
    ("Benang", "Benang Nilon", 7_500.0, Unit::Pcs),
    ("Aksesoris", "Resleting 20cm", 3_000.0, Unit::Pcs),
    ("Aksesoris", "Kancing Kayu", 1_500.0, Unit::Pcs),
    ("Aksesoris", "Tali Webbing", 60.0, Unit::Cm),
];

/// (product, description, [(material, quantity)])
const PRODUCTS: &[(&str, &str, &[(&str, f64)])] = &[
    (
        "Tas Tote Kanvas",
        "Tas belanja kanvas dengan furing",
        &[
            ("Kain Kanvas", 80.0),
            ("Kain Furing", 70.0),
            ("Benang Jahit", 1.0),
            ("Tali Webbing", 120.0),
        ],
    ),
    (
        "Dompet Katun",
        "Dompet kecil dengan resleting",
        &[
            ("Kain Katun", 30.0),
            ("Resleting 20cm", 1.0),
            ("Benang Jahit", 0.5),
        ],
    ),
    (
        "Pouch Serbaguna",
        "",
        &[
            ("Kain Katun", 40.0),
            ("Kain Furing", 40.0),
            ("Kancing Kayu", 2.0),
            ("Benang Nilon", 0.5),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./hpp_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("HPP Workbench Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./hpp_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 HPP Workbench Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Categories
    let mut category_ids: HashMap<&str, String> = HashMap::new();
    for (category_name, _, _, _) in MATERIALS {
        if category_ids.contains_key(category_name) {
            continue;
        }
        let category = db.categories().insert(category_name).await?;
        category_ids.insert(*category_name, category.id);
    }
    println!("✓ {} categories", category_ids.len());

    // Materials
    let mut materials = HashMap::new();
    for (category_name, name, price, unit) in MATERIALS {
        let Some(category_id) = category_ids.get(category_name) else {
            continue;
        };
        let material = db
            .materials()
            .insert(&MaterialInput {
                name: name.to_string(),
                category_id: category_id.clone(),
                standard_price: *price,
                unit: *unit,
            })
            .await?;
        materials.insert(*name, material);
    }
    println!("✓ {} materials", materials.len());

    // Products
    println!();
    for (name, description, lines) in PRODUCTS {
        let bom: Vec<BomLine> = lines
            .iter()
            .filter_map(|(material_name, quantity)| {
                materials
                    .get(material_name)
                    .map(|m| BomLine::from_material(m, *quantity))
            })
            .collect();

        let draft = ProductDraft {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            overhead_percentage: DEFAULT_OVERHEAD_PERCENTAGE,
            target_margin_percentage: DEFAULT_TARGET_MARGIN_PERCENTAGE,
            bom,
        };

        match db.products().insert(&draft).await {
            Ok(product) => println!(
                "  {:<20} HPP {:>12}  Jual {:>12}",
                product.name,
                format_rupiah(product.costing.production_cost.as_f64(), true),
                format_rupiah(product.costing.estimated_selling_price.as_f64(), true),
            ),
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
