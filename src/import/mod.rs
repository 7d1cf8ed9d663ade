//! Import reconciliation: per-entity row handling, the batch engine and its report

pub mod client;
pub mod engine;
pub mod outcome;
pub mod sale;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::*;
pub use engine::*;
pub use outcome::*;
pub use sale::*;
