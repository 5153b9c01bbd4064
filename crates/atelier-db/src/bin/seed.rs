//! # Seed Data Generator
//!
//! Fills a development database with a small fashion catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p atelier-db --bin seed
//!
//! # Specify database path
//! cargo run -p atelier-db --bin seed -- --db ./data/atelier.db
//! ```
//!
//! ## Generated Data
//! - Three suppliers
//! - One product per style, size and colour: `{STYLE}-{SIZE}-{COLOUR}`
//!   barcodes, prices in minor units, stock between 0 and 24
//! - Two active discounts and one retired one

use std::env;

use atelier_core::{DiscountInput, DiscountKind, Money, ProductInput, SupplierInput};
use atelier_db::{Database, DbConfig};

/// (supplier index, category, style code, name, base price in minor units)
const STYLES: &[(usize, &str, &str, &str, i64)] = &[
    (0, "Tops", "LT", "Linen Tee", 2_490_00),
    (0, "Tops", "OS", "Oxford Shirt", 4_950_00),
    (0, "Tops", "SB", "Silk Blouse", 7_800_00),
    (1, "Bottoms", "CT", "Chino Trousers", 5_400_00),
    (1, "Bottoms", "DJ", "Denim Jeans", 6_250_00),
    (1, "Bottoms", "PS", "Pleated Skirt", 4_600_00),
    (2, "Dresses", "WD", "Wrap Dress", 8_900_00),
    (2, "Dresses", "MD", "Maxi Dress", 9_750_00),
    (2, "Accessories", "SS", "Silk Scarf", 2_150_00),
    (2, "Accessories", "LB", "Leather Belt", 3_300_00),
];

/// (size, price addon in minor units)
const SIZES: &[(&str, i64)] = &[("S", 0), ("M", 0), ("L", 150_00), ("XL", 300_00)];

const COLOURS: &[(&str, &str)] = &[("BLK", "Black"), ("NVY", "Navy"), ("IVR", "Ivory")];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Nimal Perera", "Colombo Cotton Mills", "+94 11 234 5678"),
    ("Ayesha Khan", "Lahore Denim Works", "+92 42 3576 1122"),
    ("Meera Iyer", "Kandy Silk House", "+94 81 222 3344"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./atelier_dev.db");

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
                println!("Atelier POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./atelier_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atelier POS Seed Data Generator");
    println!("==================================");
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

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, company, phone) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .insert(&SupplierInput {
                name: name.to_string(),
                company: Some(company.to_string()),
                email: None,
                phone: phone.to_string(),
                address: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ Created {} suppliers", supplier_ids.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (seed, product) in catalog(&supplier_ids).into_iter().enumerate() {
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.barcode, e);
            continue;
        }
        generated += 1;

        if seed % 50 == 49 {
            println!("  Generated {} products...", generated);
        }
    }

    println!(
        "✓ Generated {} products in {:?}",
        generated,
        start.elapsed()
    );

    let discounts = [
        ("Season Opener 10%", DiscountKind::Percentage, 10, true),
        ("Loyalty Rs. 500 Off", DiscountKind::Fixed, 500_00, true),
        ("Clearance 40%", DiscountKind::Percentage, 40, false),
    ];
    let discount_count = discounts.len();
    for (name, kind, value, active) in discounts {
        db.discounts()
            .insert(&DiscountInput {
                name: name.to_string(),
                kind,
                value,
                active,
                start_date: None,
                end_date: None,
            })
            .await?;
    }
    println!("✓ Created {} discounts", discount_count);

    let sample = db.products().list(Some("silk"), 10).await?;
    println!();
    println!("Search 'silk': {} results", sample.len());
    println!("✓ Seed complete!");

    Ok(())
}

/// Expands every style into its size and colour variants.
fn catalog(supplier_ids: &[String]) -> Vec<ProductInput> {
    let mut products = Vec::new();
    let mut seed = 0usize;

    for (supplier, category, code, name, base) in STYLES {
        for (size, addon) in SIZES {
            for (colour_code, colour) in COLOURS {
                let price = base + addon;
                products.push(ProductInput {
                    barcode: format!("{}-{}-{}", code, size, colour_code),
                    name: format!("{} {}", colour, name),
                    category: category.to_string(),
                    size: Some(size.to_string()),
                    color: Some(colour.to_string()),
                    description: None,
                    price: Money::from_cents(price),
                    // cost sits at 45-60% of price
                    cost: Money::from_cents(price * (45 + (seed % 16) as i64) / 100),
                    stock: (seed * 7 % 25) as i64,
                    supplier_id: supplier_ids.get(*supplier).cloned(),
                });
                seed += 1;
            }
        }
    }

    products
}
