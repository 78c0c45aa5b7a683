//! # Seed Data Generator
//!
//! Fills a database with a small shop's worth of demo data.
//!
//! ## Usage
//! ```bash
//! # 200 products (default)
//! cargo run -p dokon-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p dokon-db --bin seed -- --count 1000 --db ./data/dokon.db
//! ```
//!
//! ## Generated Data
//! - One category per entry in `CATEGORIES`
//! - Products cycling through the category catalogues with size variants;
//!   every seventh product starts at or below its reorder threshold
//! - A handful of customers and suppliers

use std::env;
use std::sync::Arc;

use dokon_core::{DiscountRate, Money, NewCategory, NewCustomer, NewProduct, NewSupplier};
use dokon_db::{Database, DbConfig, EntityStore, Table};

/// `(category, colour, product names)`.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "Ichimliklar",
        "#3B82F6",
        &[
            "Coca-Cola",
            "Fanta",
            "Sprite",
            "Hydrolife suv",
            "Bon Aqua",
            "Dena sharbat",
            "Choy Ahmad",
        ],
    ),
    (
        "Sut mahsulotlari",
        "#10B981",
        &["Nestle sut", "Musaffo qatiq", "Lactel kefir", "Smetana", "Tvorog", "Sariyog'"],
    ),
    (
        "Non va shirinliklar",
        "#F59E0B",
        &["Obi non", "Baton", "Pechenye Yubileynoe", "Snickers", "Alpen Gold", "Vafli"],
    ),
    (
        "Oziq-ovqat",
        "#EF4444",
        &["Guruch Lazer", "Makaron Makfa", "Shakar 1kg", "Un 2kg", "Yog' Oila", "Tuz"],
    ),
    (
        "Maishiy kimyo",
        "#8B5CF6",
        &["Ariel kir yuvish", "Fairy", "Domestos", "Colgate", "Head & Shoulders"],
    ),
];

/// Size variants and the price added for each, in tiyin.
const SIZES: &[(&str, i64)] = &[
    ("0.5L", 0),
    ("1L", 3_000),
    ("1.5L", 5_000),
    ("kichik", 0),
    ("katta", 8_000),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Aziz Karimov", "+998901112233"),
    ("Dilnoza Rahimova", "+998935554466"),
    ("Jasur Toshmatov", "+998977778899"),
    ("Malika Yusupova", "+998946660011"),
];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Coca-Cola Ichimligi", "Bobur", "+998712000001"),
    ("Nestle Uzbekistan", "Sardor", "+998712000002"),
    ("Makfa Distribyutor", "Olim", "+998712000003"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./dokon_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dokon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./dokon_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Dokon Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.count(Table::Products).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut store = EntityStore::new(Arc::new(db.clone()));
    store.load().await?;
    let start = std::time::Instant::now();

    for (name, color, _) in CATEGORIES {
        store
            .add_category(&NewCategory {
                name: name.to_string(),
                description: None,
                color: color.to_string(),
            })
            .await?;
    }
    println!("✓ {} categories", CATEGORIES.len());

    let mut generated = 0;
    'outer: for (category, _, names) in CATEGORIES {
        for name in names.iter() {
            for size in SIZES {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(category, name, size, generated);
                if let Err(e) = store.add_product(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }
    println!("✓ {} products", generated);

    for (name, phone) in CUSTOMERS {
        store
            .add_customer(&NewCustomer {
                name: name.to_string(),
                phone: phone.to_string(),
                email: None,
                address: Some("Toshkent".to_string()),
                bonus_points: 0,
                total_purchases: Money::zero(),
            })
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    for (name, contact, phone) in SUPPLIERS {
        store
            .add_supplier(&NewSupplier {
                name: name.to_string(),
                contact_person: contact.to_string(),
                phone: phone.to_string(),
                email: None,
                address: None,
            })
            .await?;
    }
    println!("✓ {} suppliers", SUPPLIERS.len());

    let low = dokon_core::report::low_stock(store.products()).len();
    println!();
    println!("✓ Seed complete in {:?} ({} products low on stock)", start.elapsed(), low);

    db.close().await;
    Ok(())
}

/// Deterministic product data derived from `seed`.
fn generate_product(category: &str, name: &str, size: &(&str, i64), seed: usize) -> NewProduct {
    let (size_name, price_addon) = *size;
    let seed = seed as i64;

    // 2 000 - 20 000 so'm plus the size addon, in tiyin
    let selling = (2_000 + (seed * 1_700) % 18_000 + price_addon) * 100;
    // Cost is 60-80% of the selling price
    let cost = selling * (60 + seed % 20) / 100;

    let min_quantity = 5 + seed % 10;
    let quantity = if seed % 7 == 0 { seed % 5 } else { 20 + (seed * 13) % 80 };

    NewProduct {
        name: format!("{} {}", name, size_name),
        category: category.to_string(),
        brand: name.split_whitespace().next().unwrap_or(name).to_string(),
        cost_price: Money::from_cents(cost),
        selling_price: Money::from_cents(selling),
        discount: DiscountRate::from_percent(if seed % 11 == 0 { 10 } else { 0 }),
        quantity,
        min_quantity,
        barcode: format!("478{:010}", seed),
        description: String::new(),
        image_url: None,
    }
}
