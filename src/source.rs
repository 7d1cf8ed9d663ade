//! Reading import rows from CSV

use std::io::Read;
use std::path::Path;

use crate::types::{ImportResult, ImportRow};

/// Read every record of a CSV document into rows keyed by the header line
///
/// Cells and headers are trimmed. Records shorter than the header simply
/// lack the trailing columns, which the importer then reports per row.
pub fn read_rows<R: Read>(reader: R) -> ImportResult<Vec<ImportRow>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    collect_rows(rdr)
}

pub fn read_rows_from_path(path: impl AsRef<Path>) -> ImportResult<Vec<ImportRow>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    collect_rows(rdr)
}

fn collect_rows<R: Read>(mut rdr: csv::Reader<R>) -> ImportResult<Vec<ImportRow>> {
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(headers.iter().zip(record.iter()).collect());
    }

    Ok(rows)
}
