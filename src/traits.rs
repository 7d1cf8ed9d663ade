//! Traits for storage abstraction and per-entity import behaviour

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::*;

/// Storage abstraction for CRM records
///
/// This trait allows the import engine to work with any storage backend
/// (PostgreSQL, SQLite, in-memory, etc.) by implementing these methods.
/// The engine issues at most one entity write per row and never uses bulk
/// operations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Start a batch scope; writes until `commit` or `rollback` belong to it
    async fn begin(&mut self) -> ImportResult<()>;

    /// Make every write since `begin` permanent
    async fn commit(&mut self) -> ImportResult<()>;

    /// Discard every write since `begin`
    async fn rollback(&mut self) -> ImportResult<()>;

    /// Save a trader to storage
    async fn save_trader(&mut self, trader: &Trader) -> ImportResult<()>;

    /// All traders with the given email
    async fn traders_by_email(&self, email: &str) -> ImportResult<Vec<Trader>>;

    /// Save a new client to storage
    async fn save_client(&mut self, client: &Client) -> ImportResult<()>;

    /// Update an existing client
    async fn update_client(&mut self, client: &Client) -> ImportResult<()>;

    /// Get a client by tax identification number
    async fn find_client_by_nip(&self, nip: &str) -> ImportResult<Option<Client>>;

    /// All clients with the given name
    async fn clients_by_name(&self, name: &str) -> ImportResult<Vec<Client>>;

    /// Whether a client other than `except` uses this email
    async fn client_email_taken(&self, email: &str, except: Option<Uuid>) -> ImportResult<bool>;

    /// Save a new sale to storage
    async fn save_sale(&mut self, sale: &Sale) -> ImportResult<()>;

    /// Update an existing sale
    async fn update_sale(&mut self, sale: &Sale) -> ImportResult<()>;

    /// Get a sale by its source-system identifier
    async fn find_sale_by_external_id(&self, external_id: &Uuid) -> ImportResult<Option<Sale>>;

    /// Replace the monthly breakdown stored for a sale
    async fn replace_sale_months(&mut self, sale: &Uuid, months: &[SaleMonth])
        -> ImportResult<()>;

    /// Monthly breakdown stored for a sale, in calendar order
    async fn sale_months(&self, sale: &Uuid) -> ImportResult<Vec<SaleMonth>>;
}

/// What reconciling one validated row did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// No record matched the natural key; one was created
    Created,
    /// A record matched and these comparable fields were rewritten
    Updated(Vec<&'static str>),
    /// A record matched and nothing differed
    Skipped,
    /// The write was refused, e.g. a uniqueness conflict
    Rejected(Vec<String>),
}

/// Row validation result: a parsed draft or the messages explaining why not
pub type RowValidation<T> = Result<T, Vec<String>>;

/// Per-entity import behaviour plugged into the engine
#[async_trait]
pub trait EntityImport<S: RecordStore>: Send + Sync {
    /// Parsed, validated form of a row
    type Draft: Send;

    fn kind(&self) -> EntityKind;

    /// Exact column set a row must carry
    fn required_keys(&self) -> &'static [&'static str];

    /// Run every semantic check against the row, reading the store as needed
    async fn validate_row_data(
        &self,
        store: &S,
        row: &ImportRow,
    ) -> ImportResult<RowValidation<Self::Draft>>;

    /// Match the draft by natural key and create, update or skip
    async fn reconcile(&self, store: &mut S, draft: Self::Draft) -> ImportResult<Reconciliation>;
}
