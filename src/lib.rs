//! # CRM Import
//!
//! Bulk import reconciliation for CRM client and sale records. Spreadsheet
//! rows are validated, matched against a record store by natural key and
//! created, updated or skipped, with a per-row report of what happened.
//!
//! ## Features
//!
//! - **Row validation**: exact column sets, client/trader references, sale periods, amounts, UUIDs, tax ids and phone numbers
//! - **Reconciliation**: sales matched by `external_id`, clients by `nip`, with field-level change detection
//! - **Batch semantics**: a column mismatch stops the batch; other row problems are reported and skipped
//! - **Atomic batches**: writes of one batch commit or roll back together (configurable)
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use crm_import::{utils::MemoryStore, Importer, ImportRow};
//!
//! # async fn run() -> crm_import::ImportResult<()> {
//! let mut importer = Importer::new(MemoryStore::new());
//! let rows: Vec<ImportRow> = Vec::new();
//! let report = importer.import_sales(&rows).await?;
//! assert_eq!(report.total(), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod import;
pub mod source;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use import::*;
pub use traits::*;
pub use types::*;
