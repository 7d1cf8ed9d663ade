//! Import configuration

use chrono::NaiveDate;
use phonenumber::country;
use serde::{Deserialize, Serialize};

use crate::types::{ImportError, ImportResult};

/// How writes of one batch are scoped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// All writes of a batch commit together; an abort or store error rolls them back
    #[default]
    Atomic,
    /// Each write stands on its own; an abort leaves earlier rows applied
    BestEffort,
}

/// Settings for an import run
///
/// ```toml
/// policy = "best_effort"
/// phone_region = "DE"
/// reference_date = "2024-06-30"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub policy: BatchPolicy,
    /// ISO 3166 region used for phone numbers written without a country prefix
    pub phone_region: String,
    /// Required length of a client's tax identification number
    pub nip_length: usize,
    /// Date the "sale lies in the future" check compares against; today (UTC) when unset
    pub reference_date: Option<NaiveDate>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            policy: BatchPolicy::Atomic,
            phone_region: "PL".to_string(),
            nip_length: 10,
            reference_date: None,
        }
    }
}

impl ImportConfig {
    pub fn from_toml(input: &str) -> ImportResult<Self> {
        let config: ImportConfig =
            toml::from_str(input).map_err(|e| ImportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ImportResult<()> {
        self.region()?;

        if self.nip_length == 0 {
            return Err(ImportError::Config(
                "nip_length must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Default phone region as a libphonenumber country id
    pub fn region(&self) -> ImportResult<country::Id> {
        self.phone_region.parse::<country::Id>().map_err(|_| {
            ImportError::Config(format!("Unknown phone region '{}'", self.phone_region))
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}
