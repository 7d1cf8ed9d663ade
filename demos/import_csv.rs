//! Client and sale import from CSV
//!
//! Run with `cargo run --example import_csv [clients.csv] [sales.csv]`; the
//! bundled sample data is used for any file not given.

use crm_import::source::{read_rows, read_rows_from_path};
use crm_import::utils::MemoryStore;
use crm_import::{ImportConfig, ImportReport, ImportRow, Importer, RecordStore, Trader};
use tracing_subscriber::EnvFilter;

const CLIENTS_CSV: &str = "\
name,country,phone_number,address_line,city,email,nip,trader
Acme,Poland,+48 601 234 567,ul. Prosta 1,Warszawa,office@acme.pl,1234567890,anna.nowak@example.com
Beta,Poland,+48 512 345 678,ul. Długa 7,Gdańsk,hello@beta.pl,123456789,anna.nowak@example.com
";

const SALES_CSV: &str = "\
amount,currency,client,brand,external_id,sale_date_from,sale_date_to
12000.00,PLN,Acme,Nordic,67e55044-10b1-426f-9247-bb680e5fe0c8,2024-01-01,2024-03-31
800,USD,Gamma,Nordic,0b4e3b6e-8f7a-4e51-9d0c-1c2f0a6b7d11,2024-02-01,2024-02-29
";

fn load(path: Option<String>, fallback: &str) -> Result<Vec<ImportRow>, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => read_rows_from_path(path)?,
        None => read_rows(fallback.as_bytes())?,
    })
}

fn print_report(title: &str, report: &ImportReport) {
    println!("\n📋 {}", title);
    println!(
        "  created: {}, updated: {}, skipped: {}, errors: {}",
        report.created.len(),
        report.updated.len(),
        report.skipped.len(),
        report.errors.len()
    );
    for outcome in report.outcomes() {
        match outcome.status {
            crm_import::OutcomeStatus::Failed => {
                println!("  ❌ row {}: {}", outcome.row, outcome.errors)
            }
            crm_import::OutcomeStatus::Updated => {
                println!("  ✏️  row {}: updated {}", outcome.row, outcome.updated_fields)
            }
            status => println!("  ✓ row {}: {}", outcome.row, status),
        }
    }
    if !report.has_errors() {
        println!("  ✅ no errors");
    }
    if report.is_aborted() {
        println!("  ⚠️  batch stopped on a column mismatch; nothing was saved");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("📥 CRM Import - CSV Example");

    let mut args = std::env::args().skip(1);
    let client_rows = load(args.next(), CLIENTS_CSV)?;
    let sale_rows = load(args.next(), SALES_CSV)?;

    let mut store = MemoryStore::new();
    let trader = Trader::new(
        "anna.nowak@example.com".to_string(),
        "Anna".to_string(),
        "Nowak".to_string(),
    );
    store.save_trader(&trader).await?;
    println!("👤 Trader: {} <{}>", trader.full_name(), trader.email);

    let config = ImportConfig::from_toml(r#"reference_date = "2024-06-30""#)?;
    let mut importer = Importer::with_config(store.clone(), config)?;

    let clients = importer.import_clients(&client_rows).await?;
    print_report("Clients", &clients);

    let sales = importer.import_sales(&sale_rows).await?;
    print_report("Sales", &sales);

    println!("\n📅 Monthly breakdown:");
    for sale in store.all_sales()? {
        for month in store.sale_months(&sale.uuid).await? {
            println!(
                "  {} {}: {} {}",
                month.month_name(),
                month.year,
                month.amount,
                sale.currency
            );
        }
    }

    println!("\n🧾 Sales report as JSON:");
    println!("{}", serde_json::to_string_pretty(&sales)?);

    Ok(())
}
