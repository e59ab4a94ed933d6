//! Exclusions: manual unit assignments for transactions whose comment does
//! not name an apartment.
//!
//! The table is append-only and holds at most one entry per transaction id.
//! Unresolved transactions get a placeholder entry with unit `0`, which an
//! operator later edits to the right unit.

use crate::config;
use crate::error::{LedgerError, Result};
use crate::extractor::UnitReference;
use crate::statement::Transaction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Secondary token written into placeholder exclusions.
pub const UNKNOWN_TOKEN: &str = "Unknown";

/// A manual override for one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    #[serde(rename = "card", default)]
    pub secondary_token: String,

    #[serde(rename = "flat", default)]
    pub unit: u32,

    /// Free-form note; placeholders carry the original comment here
    #[serde(rename = "comment", default)]
    pub note: String,

    #[serde(rename = "transactionID")]
    pub transaction_id: String,

    /// Whole currency units, informational
    #[serde(default)]
    pub amount: i64,
}

impl Exclusion {
    pub fn new(
        transaction_id: impl Into<String>,
        unit: u32,
        secondary_token: impl Into<String>,
        note: impl Into<String>,
        amount: i64,
    ) -> Self {
        Exclusion {
            secondary_token: secondary_token.into(),
            unit,
            note: note.into(),
            transaction_id: transaction_id.into(),
            amount,
        }
    }

    /// Placeholder recorded for a transaction nobody has assigned yet.
    pub fn placeholder(tx: &Transaction) -> Self {
        Exclusion::new(&tx.id, 0, UNKNOWN_TOKEN, &tx.comment, tx.amount / 100)
    }

    pub fn unit_reference(&self) -> UnitReference {
        UnitReference::new(self.unit, &self.secondary_token)
    }
}

/// Finds the exclusion for a transaction id.
pub fn lookup<'a>(transaction_id: &str, exclusions: &'a [Exclusion]) -> Option<&'a Exclusion> {
    exclusions
        .iter()
        .find(|e| e.transaction_id == transaction_id)
}

/// Storage for the exclusion table.
pub trait ExclusionStore {
    /// Returns the exclusion recorded for `transaction_id`, if any.
    fn lookup(&self, transaction_id: &str) -> Result<Option<Exclusion>>;

    /// Records an exclusion. Succeeds without change when the transaction
    /// already has one.
    fn append(&mut self, exclusion: Exclusion) -> Result<()>;
}

impl ExclusionStore for Vec<Exclusion> {
    fn lookup(&self, transaction_id: &str) -> Result<Option<Exclusion>> {
        Ok(lookup(transaction_id, self).cloned())
    }

    fn append(&mut self, exclusion: Exclusion) -> Result<()> {
        if lookup(&exclusion.transaction_id, self).is_none() {
            self.push(exclusion);
        }
        Ok(())
    }
}

/// The exclusion table inside the configuration file.
///
/// Every call goes to disk, so edits made to the file between cycles are seen
/// by the next lookup.
#[derive(Debug, Clone)]
pub struct ConfigExclusionStore {
    path: PathBuf,
}

impl ConfigExclusionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigExclusionStore { path: path.into() }
    }

    fn wrap(&self, err: LedgerError) -> LedgerError {
        LedgerError::ExclusionStore {
            path: self.path.display().to_string(),
            source: Box::new(err),
        }
    }
}

impl ExclusionStore for ConfigExclusionStore {
    fn lookup(&self, transaction_id: &str) -> Result<Option<Exclusion>> {
        let config = config::Config::load(&self.path).map_err(|e| self.wrap(e))?;
        Ok(lookup(transaction_id, &config.exclusions).cloned())
    }

    fn append(&mut self, exclusion: Exclusion) -> Result<()> {
        config::add_exclusion(&self.path, exclusion).map_err(|e| self.wrap(e))
    }
}
