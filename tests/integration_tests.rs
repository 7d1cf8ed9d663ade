//! Integration tests for crm-import

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use crm_import::{
    source::read_rows, utils::MemoryStore, BatchPolicy, EntityKind, ImportConfig, Importer,
    OutcomeStatus, RecordStore, Trader,
};

const TRADER: &str = "anna.nowak@example.com";

const CLIENTS_CSV: &str = "\
name,country,phone_number,address_line,city,email,nip,trader
Acme,Poland,+48 601 234 567,ul. Prosta 1,Warszawa,office@acme.pl,1234567890,anna.nowak@example.com
Beta,Poland,+48 512 345 678,ul. Długa 7,Gdańsk,hello@beta.pl,123456789,anna.nowak@example.com
";

const SALES_CSV: &str = "\
amount,currency,client,brand,external_id,sale_date_from,sale_date_to
12000.00,PLN,Acme,Nordic,67e55044-10b1-426f-9247-bb680e5fe0c8,2024-01-01,2024-03-31
800,USD,Acme,Nordic,0b4e3b6e-8f7a-4e51-9d0c-1c2f0a6b7d11,2024-02-01,2024-02-29
";

async fn setup(policy: BatchPolicy) -> (Importer<MemoryStore>, MemoryStore) {
    let mut store = MemoryStore::new();
    store
        .save_trader(&Trader::new(
            TRADER.to_string(),
            "Anna".to_string(),
            "Nowak".to_string(),
        ))
        .await
        .unwrap();

    let config = ImportConfig {
        policy,
        reference_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        ..ImportConfig::default()
    };
    let importer = Importer::with_config(store.clone(), config).unwrap();
    (importer, store)
}

#[tokio::test]
async fn test_complete_import_workflow() {
    let (mut importer, store) = setup(BatchPolicy::Atomic).await;

    // Clients first so sales can reference them by name
    let clients = importer
        .import(EntityKind::Client, &read_rows(CLIENTS_CSV.as_bytes()).unwrap())
        .await
        .unwrap();
    assert_eq!(clients.created.len(), 1);
    assert_eq!(clients.errors.len(), 1);
    assert_eq!(clients.errors[0].row, 2);
    assert!(clients.errors[0].errors.contains("Invalid nip 123456789"));

    let sale_rows = read_rows(SALES_CSV.as_bytes()).unwrap();
    let sales = importer.import(EntityKind::Sale, &sale_rows).await.unwrap();
    assert_eq!(sales.created.len(), 2);
    assert!(sales.created.iter().all(|o| o.status == OutcomeStatus::Created));

    // Months of the first sale: January to March, remainder-free split
    let first = store
        .find_sale_by_external_id(&"67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    let months = store.sale_months(&first.uuid).await.unwrap();
    assert_eq!(months.len(), 3);
    assert!(months.iter().all(|m| m.amount == BigDecimal::from(4000)));

    // Re-running the same batch changes nothing
    let rerun = importer.import(EntityKind::Sale, &sale_rows).await.unwrap();
    assert_eq!(rerun.skipped.len(), 2);
    assert_eq!(rerun.total(), 2);
    assert_eq!(store.all_sales().unwrap().len(), 2);
}

#[tokio::test]
async fn test_updated_sale_reports_changed_fields() {
    let (mut importer, _) = setup(BatchPolicy::Atomic).await;
    importer
        .import_clients(&read_rows(CLIENTS_CSV.as_bytes()).unwrap())
        .await
        .unwrap();
    importer
        .import_sales(&read_rows(SALES_CSV.as_bytes()).unwrap())
        .await
        .unwrap();

    let changed = SALES_CSV.replace("12000.00,PLN", "12500.00,PLN");
    let report = importer
        .import_sales(&read_rows(changed.as_bytes()).unwrap())
        .await
        .unwrap();

    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].updated_fields, "amount");
    assert_eq!(report.skipped.len(), 1);
}

#[tokio::test]
async fn test_column_mismatch_aborts_whole_batch() {
    let (mut importer, store) = setup(BatchPolicy::Atomic).await;
    importer
        .import_clients(&read_rows(CLIENTS_CSV.as_bytes()).unwrap())
        .await
        .unwrap();

    // This header lacks `brand` and its short record also loses `sale_date_to`
    let data = "\
amount,currency,client,external_id,sale_date_from,sale_date_to
12000.00,PLN,Acme,67e55044-10b1-426f-9247-bb680e5fe0c8,2024-01-01
";
    let mut rows = read_rows(data.as_bytes()).unwrap();
    rows.extend(read_rows(SALES_CSV.as_bytes()).unwrap());

    let report = importer.import_sales(&rows).await.unwrap();

    assert!(report.is_aborted());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].errors,
        "Missing column brand, Missing column sale_date_to"
    );
    assert!(report.created.is_empty());
    assert!(store.all_sales().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_serializes_for_rendering() {
    let (mut importer, _) = setup(BatchPolicy::BestEffort).await;
    let report = importer
        .import_clients(&read_rows(CLIENTS_CSV.as_bytes()).unwrap())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["created"][0]["status"], "created");
    assert_eq!(json["created"][0]["fields"]["nip"], "1234567890");
    assert_eq!(json["errors"][0]["status"], "failed");
    assert!(json["updated"].as_array().unwrap().is_empty());
    assert!(json.get("aborted").is_none());
}

#[test]
fn test_unknown_kind_is_a_config_error() {
    assert!("roadmap".parse::<EntityKind>().is_err());
    assert!(ImportConfig::from_toml(r#"phone_region = "??""#).is_err());
}
