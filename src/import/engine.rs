//! Batch importer that drives rows through validation and reconciliation

use tracing::{error, info, warn};

use crate::config::{BatchPolicy, ImportConfig};
use crate::import::client::ClientImport;
use crate::import::outcome::{ImportReport, ResultAggregator};
use crate::import::sale::SaleImport;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_keys;

/// Runs import batches against a record store
///
/// Rows are processed one at a time, in order. A row whose columns do not
/// match the required set stops the batch; any other row-level problem is
/// recorded and the batch moves on.
pub struct Importer<S: RecordStore> {
    store: S,
    config: ImportConfig,
}

impl<S: RecordStore> Importer<S> {
    /// Create an importer with the default configuration
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ImportConfig::default(),
        }
    }

    /// Create an importer with a custom configuration
    pub fn with_config(store: S, config: ImportConfig) -> ImportResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Import sale rows, matching existing sales by `external_id`
    pub async fn import_sales(&mut self, rows: &[ImportRow]) -> ImportResult<ImportReport> {
        let sales = SaleImport::new(self.config.today());
        self.run(&sales, rows).await
    }

    /// Import client rows, matching existing clients by `nip`
    pub async fn import_clients(&mut self, rows: &[ImportRow]) -> ImportResult<ImportReport> {
        let clients = ClientImport::new(self.config.region()?, self.config.nip_length);
        self.run(&clients, rows).await
    }

    pub async fn import(
        &mut self,
        kind: EntityKind,
        rows: &[ImportRow],
    ) -> ImportResult<ImportReport> {
        match kind {
            EntityKind::Sale => self.import_sales(rows).await,
            EntityKind::Client => self.import_clients(rows).await,
        }
    }

    /// Run one batch under the configured [`BatchPolicy`]
    pub async fn run<I: EntityImport<S>>(
        &mut self,
        entity: &I,
        rows: &[ImportRow],
    ) -> ImportResult<ImportReport> {
        let atomic = self.config.policy == BatchPolicy::Atomic;
        info!(
            kind = %entity.kind(),
            rows = rows.len(),
            policy = ?self.config.policy,
            "import started"
        );

        if atomic {
            self.store.begin().await?;
        }

        let report = match self.process(entity, rows).await {
            Ok(report) => report,
            Err(err) => {
                error!(kind = %entity.kind(), error = %err, "import failed");
                if atomic {
                    if let Err(rollback_err) = self.store.rollback().await {
                        error!(error = %rollback_err, "rollback after failed import failed");
                    }
                }
                return Err(err);
            }
        };

        if atomic {
            if report.is_aborted() {
                self.store.rollback().await?;
            } else {
                self.store.commit().await?;
            }
        }

        info!(
            kind = %entity.kind(),
            created = report.created.len(),
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            aborted = report.is_aborted(),
            "import finished"
        );
        Ok(report)
    }

    async fn process<I: EntityImport<S>>(
        &mut self,
        entity: &I,
        rows: &[ImportRow],
    ) -> ImportResult<ImportReport> {
        let mut aggregator = ResultAggregator::new();

        for (idx, row) in rows.iter().enumerate() {
            let number = idx + 1;

            if let Err(messages) = validate_keys(row, entity.required_keys()) {
                warn!(row = number, errors = ?messages, "column mismatch, stopping batch");
                aggregator.failed(number, row, &messages);
                return Ok(aggregator.abort());
            }

            let draft = match entity.validate_row_data(&self.store, row).await? {
                Ok(draft) => draft,
                Err(messages) => {
                    warn!(row = number, errors = ?messages, "row failed validation");
                    aggregator.failed(number, row, &messages);
                    continue;
                }
            };

            match entity.reconcile(&mut self.store, draft).await? {
                Reconciliation::Created => aggregator.created(number, row),
                Reconciliation::Updated(fields) => aggregator.updated(number, row, &fields),
                Reconciliation::Skipped => aggregator.skipped(number, row),
                Reconciliation::Rejected(messages) => {
                    warn!(row = number, errors = ?messages, "row rejected");
                    aggregator.failed(number, row, &messages);
                }
            }
        }

        Ok(aggregator.finish())
    }
}
