//! Shared rows and records for import tests

use chrono::NaiveDate;
use uuid::Uuid;

use crate::traits::RecordStore;
use crate::types::*;
use crate::utils::MemoryStore;

pub(crate) const EXTERNAL_ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";
pub(crate) const TRADER_EMAIL: &str = "anna.nowak@example.com";

pub(crate) fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

pub(crate) fn sale_row() -> ImportRow {
    [
        ("amount", "1500.00"),
        ("currency", "PLN"),
        ("client", "Acme"),
        ("brand", "Nordic"),
        ("external_id", EXTERNAL_ID),
        ("sale_date_from", "2024-01-01"),
        ("sale_date_to", "2024-03-31"),
    ]
    .into_iter()
    .collect()
}

pub(crate) fn client_row() -> ImportRow {
    [
        ("name", "Acme"),
        ("country", "Poland"),
        ("phone_number", "+48 601 234 567"),
        ("address_line", "ul. Prosta 1"),
        ("city", "Warszawa"),
        ("email", "office@acme.pl"),
        ("nip", "1234567890"),
        ("trader", TRADER_EMAIL),
    ]
    .into_iter()
    .collect()
}

pub(crate) fn with(mut row: ImportRow, column: &str, value: &str) -> ImportRow {
    row.insert(column, value);
    row
}

pub(crate) fn client(name: &str, nip: &str, email: &str) -> Client {
    Client {
        uuid: Uuid::new_v4(),
        name: name.to_string(),
        country: "Poland".to_string(),
        phone_number: "+48 601 234 567".to_string(),
        address_line: "ul. Prosta 1".to_string(),
        city: "Warszawa".to_string(),
        email: email.to_string(),
        nip: nip.to_string(),
        trader: None,
        created_date: reference_date(),
        external_id: None,
    }
}

/// Store holding one trader and the client "Acme"
pub(crate) async fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .save_trader(&Trader::new(
            TRADER_EMAIL.to_string(),
            "Anna".to_string(),
            "Nowak".to_string(),
        ))
        .await
        .unwrap();
    store
        .save_client(&client("Acme", "9999999999", "billing@acme.pl"))
        .await
        .unwrap();
    store
}
