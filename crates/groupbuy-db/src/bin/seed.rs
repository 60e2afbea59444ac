//! # Seed Data Generator
//!
//! Populates the database with a demo group purchase for development.
//!
//! ## Usage
//! ```bash
//! # Database from GROUPBUY_DB_PATH (default ./groupbuy.db)
//! cargo run -p groupbuy-db --bin seed
//!
//! # Specify database path
//! cargo run -p groupbuy-db --bin seed -- --db ./data/groupbuy.db
//!
//! # More logging
//! RUST_LOG=groupbuy_db=debug cargo run -p groupbuy-db --bin seed
//! ```
//!
//! ## Generated Data
//! - One administrator and three members
//! - Two deposit points, one of them the default
//! - A monthly order with one wish per game below
//! - A basket batching those wishes, costed with shipping and customs

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;

use groupbuy_core::validation::{
    CreateBasketInput, CreateOrderInput, CreateWishInput, EditBasketInput, EditBasketWish,
};
use groupbuy_core::{Money, OrderType};
use groupbuy_db::{Database, DbConfig};

/// (member index, game, publisher reference, unit price in cents)
const GAMES: &[(usize, &str, &str, i64)] = &[
    (0, "Cascadia", "CAS-FR", 3490),
    (1, "Azul", "AZU-FR", 3290),
    (1, "Ark Nova", "ARK-FR", 5990),
    (2, "Heat: Pedal to the Metal", "HEA-FR", 4990),
    (2, "The Crew", "CRW-FR", 1390),
];

const MEMBERS: &[(&str, &str)] = &[
    ("Camille", "camille@example.org"),
    ("Nora", "nora@example.org"),
    ("Sacha", "sacha@example.org"),
];

const SHIPPING_CENTS: i64 = 1890;
const CUSTOMS_CENTS: i64 = 2437;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config = DbConfig::new(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Group-Buy Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $GROUPBUY_DB_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Group-Buy Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database, migrations applied");

    if !db.orders().list_all().await?.is_empty() {
        println!("⚠ Database already has orders");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = db
        .users()
        .create("Admin", "admin@example.org", Some("admin"))
        .await?;
    let mut members = Vec::with_capacity(MEMBERS.len());
    for (name, email) in MEMBERS {
        members.push(db.users().create(name, email, None).await?);
    }
    println!("✓ Created {} users", members.len() + 1);

    db.deposit_points()
        .create("Boutique Le Dé Rouge", "12 rue des Dés, 69001 Lyon", true)
        .await?;
    db.deposit_points()
        .create("Club du jeudi", "3 place du Jeu, 69003 Lyon", false)
        .await?;
    println!("✓ Created deposit points");

    let order = db
        .orders()
        .create(
            &CreateOrderInput {
                order_type: OrderType::Monthly,
                target_date: Utc::now() + Duration::days(21),
                description: Some("Commande mensuelle Philibert".to_string()),
            },
            &admin.id,
        )
        .await?;
    println!("✓ Opened order {}", order.id);

    let mut priced = Vec::with_capacity(GAMES.len());
    for (member, game, reference, price) in GAMES {
        let wish = db
            .wishes()
            .create(
                &CreateWishInput {
                    order_id: order.id.clone(),
                    game_name: game.to_string(),
                    publisher_reference: reference.to_string(),
                    publisher_url: None,
                },
                &members[*member].id,
            )
            .await?;
        priced.push(EditBasketWish {
            id: wish.id,
            unit_price: Money::from_cents(*price),
        });
    }
    println!("✓ Submitted {} wishes", priced.len());

    let basket = db
        .baskets()
        .create(
            &CreateBasketInput {
                order_id: order.id.clone(),
                name: None,
                wish_ids: priced.iter().map(|w| w.id.clone()).collect(),
            },
            &admin.id,
        )
        .await?;

    let costing = db
        .baskets()
        .apply_costs(
            &basket.basket.id,
            &EditBasketInput {
                shipping_cost: Money::from_cents(SHIPPING_CENTS),
                customs_cost: Some(Money::from_cents(CUSTOMS_CENTS)),
                wishes: priced,
            },
        )
        .await?;

    println!();
    println!("Basket \"{}\"", basket.basket.name);
    println!(
        "  {:<28} {:>10} {:>10} {:>10} {:>10}",
        "Game", "Price", "Shipping", "Customs", "Due"
    );
    for (wish, (_, game, _, _)) in costing.wishes.iter().zip(GAMES) {
        println!(
            "  {:<28} {:>10} {:>10} {:>10} {:>10}",
            game,
            wish.unit_price.to_string(),
            wish.shipping_share.to_string(),
            wish.customs_share.to_string(),
            wish.amount_due.to_string()
        );
    }
    println!(
        "  {:<28} {:>10} {:>10} {:>10} {:>10}",
        "Total",
        costing.goods_total().to_string(),
        costing.shipping_cost.to_string(),
        costing.customs_cost.unwrap_or_default().to_string(),
        costing.grand_total().to_string()
    );

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
