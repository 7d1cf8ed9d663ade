//! Core records and error types for the import system

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of record a batch imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Sale rows, matched by `external_id`
    Sale,
    /// Client rows, matched by `nip`
    Client,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Sale => "sales",
            EntityKind::Client => "client",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "sales" => Ok(EntityKind::Sale),
            "client" | "clients" => Ok(EntityKind::Client),
            other => Err(ImportError::Config(format!(
                "Unknown import kind '{}', expected 'sales' or 'client'",
                other
            ))),
        }
    }
}

/// Currencies a sale can be booked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    PLN,
    USD,
    EUR,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::PLN => "PLN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLN" => Ok(Currency::PLN),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            other => Err(format!(
                "Invalid currency {}: expected one of PLN, USD, EUR",
                other
            )),
        }
    }
}

/// One spreadsheet line: column name to raw cell value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportRow(BTreeMap<String, String>);

impl ImportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, replacing any previous value for the column
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Cell value with surrounding whitespace removed; empty when the column is absent
    pub fn field(&self, column: &str) -> &str {
        self.get(column).map(str::trim).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImportRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Sales representative a client is assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trader {
    pub uuid: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Trader {
    pub fn new(email: String, first_name: String, last_name: String) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            email,
            first_name,
            last_name,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Client company record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub uuid: Uuid,
    pub name: String,
    pub country: String,
    pub phone_number: String,
    pub address_line: String,
    pub city: String,
    pub email: String,
    /// Tax identification number, the natural key for imports
    pub nip: String,
    /// Trader responsible for the client
    pub trader: Option<Uuid>,
    pub created_date: NaiveDate,
    pub external_id: Option<Uuid>,
}

/// Sale booked against a client for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub uuid: Uuid,
    pub client: Option<Uuid>,
    pub amount: BigDecimal,
    pub currency: Currency,
    pub brand: Option<String>,
    pub sale_date_from: NaiveDate,
    pub sale_date_to: NaiveDate,
    pub created_date: NaiveDate,
    /// Identifier from the source system, the natural key for imports
    pub external_id: Option<Uuid>,
}

impl Sale {
    /// Split the amount evenly across every calendar month the sale period touches.
    ///
    /// Each share is rounded to two decimal places; the last month absorbs the
    /// rounding remainder so the shares always add up to `amount`.
    pub fn monthly_breakdown(&self) -> Vec<SaleMonth> {
        let mut months = Vec::new();
        let (mut year, mut month) = (self.sale_date_from.year(), self.sale_date_from.month());
        let end = (self.sale_date_to.year(), self.sale_date_to.month());

        while (year, month) <= end {
            months.push((year, month));
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }

        if months.is_empty() {
            return Vec::new();
        }

        let share = (&self.amount / BigDecimal::from(months.len() as u64))
            .with_scale_round(2, RoundingMode::HalfUp);
        let mut allocated = BigDecimal::from(0);
        let last = months.len() - 1;

        months
            .into_iter()
            .enumerate()
            .map(|(idx, (year, month))| {
                let amount = if idx == last {
                    &self.amount - &allocated
                } else {
                    allocated += &share;
                    share.clone()
                };
                SaleMonth {
                    sale: self.uuid,
                    year,
                    month,
                    amount,
                }
            })
            .collect()
    }
}

/// Share of a sale's amount attributed to one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleMonth {
    pub sale: Uuid,
    pub year: i32,
    /// Month number, 1 through 12
    pub month: u32,
    pub amount: BigDecimal,
}

impl SaleMonth {
    /// English month name, e.g. "March"
    pub fn month_name(&self) -> &'static str {
        chrono::Month::try_from(self.month as u8)
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }
}

/// Errors that stop an import call
///
/// Row-level problems never surface here; they are reported per row in the
/// import report.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Source error: {0}")]
    Source(#[from] csv::Error),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
