//! # Seed Data Generator
//!
//! Populates the database with demo customers and invoices for development.
//!
//! ## Usage
//! ```bash
//! # 10 customers, one invoice each (default)
//! cargo run -p invoicer-service --bin seed
//!
//! # Custom amount
//! cargo run -p invoicer-service --bin seed -- --customers 50
//!
//! # Specify database path
//! cargo run -p invoicer-service --bin seed -- --db ./data/invoicer.db
//! ```
//!
//! Everything goes through the command layer, so seeded rows pass the same
//! rules as real ones. Every third invoice is marked paid afterwards.

use chrono::{Duration, Local};
use std::env;
use std::path::PathBuf;

use invoicer_core::{CustomerDraft, InvoiceDraft, InvoiceUpdate, ItemDraft, Money};
use invoicer_service::commands::{create_customer, create_invoice, update_invoice};
use invoicer_service::{connect, init_tracing, AppConfig};

/// Company names for demo customers
const COMPANIES: &[&str] = &[
    "Acme Supplies",
    "Globex",
    "Initech",
    "Umbrella Foods",
    "Stark Hardware",
    "Wayne Logistics",
    "Hooli",
    "Vandelay Imports",
    "Soylent Catering",
    "Wonka Confectionery",
];

/// Billable lines: description and unit price in cents
const SERVICES: &[(&str, i64)] = &[
    ("Consulting hour", 12_000),
    ("Support plan (monthly)", 4_999),
    ("Installation", 25_000),
    ("Training session", 8_050),
    ("Hosting (monthly)", 1_999),
    ("Hardware rental", 3_500),
];

const DEFAULT_CUSTOMERS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut customers: usize = DEFAULT_CUSTOMERS;
    let mut db_path = String::from("./invoicer_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(DEFAULT_CUSTOMERS);
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
                println!("Invoicer Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Customers to create, one invoice each (default: 10)");
                println!("  -d, --db <PATH>      Database file path (default: ./invoicer_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    println!("Invoicer Seed Data Generator");
    println!("============================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customers);
    println!();

    let config = AppConfig {
        database_path: PathBuf::from(&db_path),
        max_connections: 1,
        run_migrations: true,
    };
    let db = connect(&config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating customers and invoices...");

    let today = Local::now().date_naive();
    let mut invoices = 0;
    let mut billed = Money::zero();

    for n in 0..customers {
        let company = COMPANIES[n % COMPANIES.len()];
        let draft = CustomerDraft {
            name: format!("{} #{}", company, n + 1),
            email: format!("billing+{}@{}.test", n + 1, slug(company)),
            address: (n % 2 == 0).then(|| format!("{} Main Street", 100 + n)),
        };

        let customer = match create_customer(&db, draft).await {
            Ok(customer) => customer,
            Err(e) => {
                eprintln!("Failed to create customer {}: {}", n + 1, e);
                continue;
            }
        };

        let invoice = match create_invoice(&db, invoice_draft(&customer.id, n, today)).await {
            Ok(invoice) => invoice,
            Err(e) => {
                eprintln!("Failed to invoice {}: {}", customer.name, e);
                continue;
            }
        };

        if n % 3 == 0 {
            update_invoice(&db, &invoice.id, InvoiceUpdate::status("paid")).await?;
        }

        invoices += 1;
        billed = billed.checked_add(invoice.total_amount).unwrap_or(billed);
    }

    println!();
    println!("✓ Created {} customers", db.customers().count().await?);
    println!("✓ Created {} invoices, {} billed", invoices, billed);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// One to three lines, due 14 to 42 days after today.
fn invoice_draft(customer_id: &str, seed: usize, today: chrono::NaiveDate) -> InvoiceDraft {
    let lines = 1 + seed % 3;
    let items = (0..lines)
        .map(|line| {
            let (description, cents) = SERVICES[(seed + line) % SERVICES.len()];
            ItemDraft {
                description: description.to_string(),
                quantity: Some((1 + ((seed + line) % 4) as i64).into()),
                unit_price: Some(Money::from_cents(cents).into()),
            }
        })
        .collect();

    InvoiceDraft {
        customer: Some(customer_id.to_string()),
        due_date: Some((today + Duration::days(14 * (1 + (seed % 3) as i64))).into()),
        status: None,
        items: Some(items),
    }
}

/// "Umbrella Foods" → "umbrellafoods"
fn slug(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
