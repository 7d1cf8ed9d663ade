//! Per-row outcomes and the batch report they aggregate into

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ImportRow;

/// Terminal state of one imported row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Created,
    Updated,
    Skipped,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Created => "created",
            OutcomeStatus::Updated => "updated",
            OutcomeStatus::Skipped => "skipped",
            OutcomeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    /// 1-based position of the row in the batch
    pub row: usize,
    pub status: OutcomeStatus,
    pub fields: ImportRow,
    /// Names of rewritten fields, joined with ", "; empty unless updated
    pub updated_fields: String,
    /// Error messages, joined with ", "; empty unless failed
    pub errors: String,
}

impl RowOutcome {
    fn new(row: usize, status: OutcomeStatus, fields: &ImportRow) -> Self {
        Self {
            row,
            status,
            fields: fields.clone(),
            updated_fields: String::new(),
            errors: String::new(),
        }
    }
}

/// Result of one import call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: Vec<RowOutcome>,
    pub updated: Vec<RowOutcome>,
    pub skipped: Vec<RowOutcome>,
    pub errors: Vec<RowOutcome>,
    /// Set when a column mismatch stopped the batch early
    #[serde(skip)]
    pub aborted: bool,
}

impl ImportReport {
    /// Number of rows accounted for across all buckets
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.skipped.len() + self.errors.len()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every outcome ordered by row number
    pub fn outcomes(&self) -> Vec<&RowOutcome> {
        let mut all: Vec<&RowOutcome> = self
            .created
            .iter()
            .chain(&self.updated)
            .chain(&self.skipped)
            .chain(&self.errors)
            .collect();
        all.sort_by_key(|outcome| outcome.row);
        all
    }
}

/// Collects row outcomes while a batch runs
#[derive(Debug, Default)]
pub struct ResultAggregator {
    report: ImportReport,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&mut self, row: usize, fields: &ImportRow) {
        self.report
            .created
            .push(RowOutcome::new(row, OutcomeStatus::Created, fields));
    }

    pub fn updated(&mut self, row: usize, fields: &ImportRow, changed: &[&str]) {
        let mut outcome = RowOutcome::new(row, OutcomeStatus::Updated, fields);
        outcome.updated_fields = changed.join(", ");
        self.report.updated.push(outcome);
    }

    pub fn skipped(&mut self, row: usize, fields: &ImportRow) {
        self.report
            .skipped
            .push(RowOutcome::new(row, OutcomeStatus::Skipped, fields));
    }

    pub fn failed(&mut self, row: usize, fields: &ImportRow, messages: &[String]) {
        let mut outcome = RowOutcome::new(row, OutcomeStatus::Failed, fields);
        outcome.errors = messages.join(", ");
        self.report.errors.push(outcome);
    }

    pub fn finish(self) -> ImportReport {
        self.report
    }

    /// Report for a batch stopped by a column mismatch: only the errors survive
    pub fn abort(self) -> ImportReport {
        ImportReport {
            errors: self.report.errors,
            aborted: true,
            ..ImportReport::default()
        }
    }
}
