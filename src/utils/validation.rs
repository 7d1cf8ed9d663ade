//! Row validation utilities
//!
//! Every check returns a user-facing message naming the column and value at
//! fault, so callers can collect all of them for one row.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use phonenumber::country;
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::traits::RowValidation;
use crate::types::ImportRow;

/// Check that the row carries exactly the required columns
pub fn validate_keys(row: &ImportRow, required: &[&str]) -> RowValidation<()> {
    let present: BTreeSet<&str> = row.columns().collect();
    let expected: BTreeSet<&str> = required.iter().copied().collect();

    let mut errors: Vec<String> = required
        .iter()
        .filter(|column| !present.contains(*column))
        .map(|column| format!("Missing column {}", column))
        .collect();

    errors.extend(
        present
            .difference(&expected)
            .map(|column| format!("Unexpected column {}", column)),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Largest number of digits a stored amount may carry
pub const AMOUNT_MAX_DIGITS: i64 = 20;

/// Decimal places a stored amount may carry
pub const AMOUNT_DECIMAL_PLACES: i64 = 2;

/// Parse a decimal amount, accepting `,` as the decimal separator
///
/// A comma only counts as a separator when it is the sole one and is
/// followed by at most two digits, so grouped thousands like `1,000` fail.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, String> {
    let value = raw.trim();
    let invalid = || format!("Invalid amount {}", raw);

    let normalized = match value.split_once(',') {
        None => value.to_string(),
        Some((whole, cents))
            if !value.contains('.')
                && !cents.contains(',')
                && cents.len() <= AMOUNT_DECIMAL_PLACES as usize =>
        {
            format!("{}.{}", whole, cents)
        }
        Some(_) => return Err(invalid()),
    };

    let amount = BigDecimal::from_str(&normalized).map_err(|_| invalid())?;

    // Exponent notation is bounded here, before anything rescales the value
    let (_, scale) = amount.as_bigint_and_exponent();
    let digits = amount.digits() as i64;
    let total_digits = if scale < 0 {
        digits.saturating_sub(scale)
    } else {
        digits.max(scale)
    };
    if scale > AMOUNT_DECIMAL_PLACES || total_digits > AMOUNT_MAX_DIGITS {
        return Err(format!(
            "Invalid amount {}: at most {} digits with {} decimal places",
            raw, AMOUNT_MAX_DIGITS, AMOUNT_DECIMAL_PLACES
        ));
    }

    Ok(amount)
}

pub fn parse_external_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| format!("Invalid external_id {}: not a UUID", raw))
}

/// Parse a calendar date; a trailing time of day is accepted and dropped
pub fn parse_date(column: &str, raw: &str) -> Result<NaiveDate, String> {
    let value = raw.trim();

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date())
        })
        .map_err(|_| format!("Invalid {} {}: expected YYYY-MM-DD", column, raw))
}

/// Check a sale period is ordered and does not lie entirely after `today`
pub fn validate_sale_period(
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if from > to {
        errors.push(format!(
            "Invalid sale period: sale_date_from {} is after sale_date_to {}",
            from, to
        ));
    }

    if from > today && to > today {
        errors.push(format!(
            "Invalid sale period {} - {}: lies entirely in the future",
            from, to
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Tax identification number must have exactly `length` characters
pub fn validate_nip(nip: &str, length: usize) -> Result<(), String> {
    if nip.chars().count() == length {
        Ok(())
    } else {
        Err(format!("Invalid nip {}: expected {} characters", nip, length))
    }
}

pub fn validate_phone_number(raw: &str, region: country::Id) -> Result<(), String> {
    match phonenumber::parse(Some(region), raw.trim()) {
        Ok(number) if phonenumber::is_valid(&number) => Ok(()),
        _ => Err(format!("Invalid phone_number {}", raw)),
    }
}

/// Keep the parsed value, or push its message onto `errors`
pub fn collect<T>(result: Result<T, String>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(message);
            None
        }
    }
}

/// Pick the single record a reference resolves to
///
/// `label` names the reference in messages, e.g. `"Client"`; `field` the
/// column used to look it up.
pub fn resolve_unique<T>(
    mut matches: Vec<T>,
    label: &str,
    field: &str,
    value: &str,
) -> Result<T, String> {
    match matches.len() {
        0 => Err(format!("{} with {} {} does not exist", label, field, value)),
        1 => Ok(matches.remove(0)),
        n => Err(format!(
            "{} {} {} is ambiguous: {} records match",
            label, field, value, n
        )),
    }
}
