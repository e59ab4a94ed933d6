//! One ledger sheet: contributions per apartment for a reporting period.
//!
//! # Invariants
//!
//! - At most one row per unit
//! - Every transaction id appears in exactly one row
//! - A row's `amount` is the sum of the whole-unit amounts of its ids
//!
//! The sheet keeps two derived indexes (unit → row position and
//! transaction id → unit) that are rebuilt whenever row positions move.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Column names of the header row, in order.
pub const HEADER: [&str; 3] = ["unit", "amount", "transactionIDs"];

/// Separator of transaction ids inside a cell.
pub const ID_SEPARATOR: &str = ",";

/// Contributions of one apartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Apartment number. `0` collects unresolved transactions.
    pub unit: u32,

    /// Whole currency units, truncated per transaction.
    pub amount: i64,

    /// Contributing transactions in first-seen order.
    #[serde(
        rename = "transactionIDs",
        serialize_with = "join_ids",
        deserialize_with = "split_ids"
    )]
    pub transaction_ids: Vec<String>,
}

impl LedgerRow {
    /// Creates a row for a unit's first transaction.
    pub fn new(unit: u32, amount: i64, transaction_id: impl Into<String>) -> Self {
        LedgerRow {
            unit,
            amount,
            transaction_ids: vec![transaction_id.into()],
        }
    }

    /// Ids rendered the way they are stored in the sheet.
    pub fn joined_ids(&self) -> String {
        self.transaction_ids.join(ID_SEPARATOR)
    }

    /// Returns `true` for the empty placeholder row.
    pub fn is_degenerate(&self) -> bool {
        self.unit == 0 && self.amount == 0
    }
}

fn join_ids<S>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ids.join(ID_SEPARATOR))
}

fn split_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.split(ID_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect())
}

/// A sheet of ledger rows under a fixed header.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    name: String,
    rows: Vec<LedgerRow>,
    by_unit: HashMap<u32, usize>,
    by_transaction: HashMap<String, u32>,
}

impl Ledger {
    /// Creates an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Ledger {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates a sheet from stored rows.
    ///
    /// Rows repeating an already seen unit are folded into the first one, and
    /// repeats of an already seen transaction id are dropped (the row amount is
    /// left as stored), so a hand-edited sheet cannot break the invariants.
    pub fn from_rows(name: impl Into<String>, rows: impl IntoIterator<Item = LedgerRow>) -> Self {
        let mut ledger = Ledger::new(name);
        let mut seen = HashSet::new();
        for mut row in rows {
            row.transaction_ids.retain(|id| {
                let first = seen.insert(id.clone());
                if !first {
                    warn!(
                        "Sheet {}: dropping repeated transaction {} from unit {}",
                        ledger.name, id, row.unit
                    );
                }
                first
            });

            match ledger.by_unit.get(&row.unit).copied() {
                Some(pos) => {
                    let existing = &mut ledger.rows[pos];
                    existing.amount += row.amount;
                    existing.transaction_ids.extend(row.transaction_ids);
                }
                None => {
                    ledger.by_unit.insert(row.unit, ledger.rows.len());
                    ledger.rows.push(row);
                }
            }
        }
        ledger.reindex();
        ledger
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the row of a unit.
    pub fn find_row(&self, unit: u32) -> Option<&LedgerRow> {
        self.by_unit.get(&unit).map(|&pos| &self.rows[pos])
    }

    /// Unit under which a transaction is already recorded.
    pub fn recorded_unit(&self, transaction_id: &str) -> Option<u32> {
        self.by_transaction.get(transaction_id).copied()
    }

    /// Adds a transaction to a unit's row, creating the row if needed.
    pub fn upsert_row(&mut self, unit: u32, delta_amount: i64, transaction_id: &str) {
        match self.by_unit.get(&unit).copied() {
            Some(pos) => {
                let row = &mut self.rows[pos];
                row.amount += delta_amount;
                row.transaction_ids.push(transaction_id.to_string());
            }
            None => {
                self.by_unit.insert(unit, self.rows.len());
                self.rows
                    .push(LedgerRow::new(unit, delta_amount, transaction_id));
            }
        }
        self.by_transaction.insert(transaction_id.to_string(), unit);
    }

    /// Takes a transaction out of a unit's row and subtracts its amount.
    ///
    /// Returns `false` if the row does not hold the transaction. The row itself
    /// stays, even when emptied.
    pub fn withdraw(&mut self, unit: u32, transaction_id: &str, amount: i64) -> bool {
        let Some(pos) = self.by_unit.get(&unit).copied() else {
            return false;
        };

        let row = &mut self.rows[pos];
        let before = row.transaction_ids.len();
        row.transaction_ids.retain(|id| id != transaction_id);
        if row.transaction_ids.len() == before {
            return false;
        }

        row.amount -= amount;
        self.by_transaction.remove(transaction_id);
        true
    }

    /// Drops the first data row when it is the empty unit-0 placeholder.
    ///
    /// Returns `true` if a row was removed.
    pub fn prune_zero_row(&mut self) -> bool {
        match self.rows.first() {
            Some(row) if row.is_degenerate() => {
                self.rows.remove(0);
                self.reindex();
                true
            }
            _ => false,
        }
    }

    /// Orders data rows by ascending unit. Stable.
    pub fn sort_by_unit(&mut self) {
        self.rows.sort_by_key(|row| row.unit);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_unit.clear();
        self.by_transaction.clear();
        for (pos, row) in self.rows.iter().enumerate() {
            self.by_unit.insert(row.unit, pos);
            for id in &row.transaction_ids {
                self.by_transaction.insert(id.clone(), row.unit);
            }
        }
    }

    /// Verifies the one-row-per-unit and one-row-per-transaction invariants.
    pub fn check_invariant(&self) -> bool {
        let mut units = HashSet::new();
        let mut ids = HashSet::new();
        self.rows.iter().all(|row| {
            units.insert(row.unit)
                && row.transaction_ids.iter().all(|id| ids.insert(id.as_str()))
        })
    }
}
