//! Core reconciliation engine.
//!
//! Merges statement transactions into a ledger sheet exactly once each,
//! grouping them by the apartment number found in the payment comment.
//! Transactions without a usable comment are resolved through the exclusion
//! table, and recorded there as placeholders when nobody has assigned them yet.

use crate::error::Result;
use crate::exclusion::{Exclusion, ExclusionStore};
use crate::extractor::{self, UnitReference};
use crate::ledger::Ledger;
use crate::statement::Transaction;
use log::{debug, error};

/// Converts a minor-unit amount to whole currency units, truncating toward zero.
pub fn whole_units(minor: i64) -> i64 {
    minor / 100
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Transactions newly added to a row
    pub merged: usize,

    /// Transactions already recorded and left alone
    pub skipped: usize,

    /// Transactions moved from the unresolved row to their real unit
    pub migrated: usize,

    /// Transactions that ended up under unit 0 in this pass
    pub unresolved: usize,
}

/// Outcome of resolving one transaction to a unit.
enum Resolution {
    /// Unit read from the comment
    Extracted(UnitReference),

    /// Unit taken from the exclusion table
    Excluded(UnitReference),
}

impl Resolution {
    fn unit(&self) -> u32 {
        match self {
            Resolution::Extracted(r) | Resolution::Excluded(r) => r.unit,
        }
    }
}

/// Reconciles a batch of transactions into a ledger sheet.
///
/// Transactions are processed in the order given. The pass is atomic with
/// respect to the ledger: it runs on a scratch copy that replaces `ledger`
/// only when every transaction went through. Exclusions appended before a
/// failure stay in the store; re-running the pass is safe.
pub fn reconcile<S: ExclusionStore + ?Sized>(
    ledger: &mut Ledger,
    transactions: &[Transaction],
    store: &mut S,
) -> Result<ReconcileSummary> {
    let mut scratch = ledger.clone();
    let mut summary = ReconcileSummary::default();

    for tx in transactions {
        reconcile_transaction(&mut scratch, tx, store, &mut summary)?;
    }

    debug_assert!(scratch.check_invariant(), "ledger invariant violated");

    *ledger = scratch;
    Ok(summary)
}

/// Processes a single transaction.
fn reconcile_transaction<S: ExclusionStore + ?Sized>(
    ledger: &mut Ledger,
    tx: &Transaction,
    store: &mut S,
    summary: &mut ReconcileSummary,
) -> Result<()> {
    let resolution = resolve(tx, store)?;
    let unit = resolution.unit();
    let amount = whole_units(tx.amount);

    if let Some(recorded) = ledger.recorded_unit(&tx.id) {
        if recorded == 0 && unit != 0 {
            ledger.withdraw(0, &tx.id, amount);
            ledger.upsert_row(unit, amount, &tx.id);
            summary.migrated += 1;
            debug!(
                "Transaction {}: moved {} from unresolved row to unit {}",
                tx.id, amount, unit
            );
        } else {
            summary.skipped += 1;
            debug!(
                "Transaction {}: already recorded under unit {}, ignoring",
                tx.id, recorded
            );
        }
        return Ok(());
    }

    ledger.upsert_row(unit, amount, &tx.id);
    summary.merged += 1;
    if unit == 0 {
        summary.unresolved += 1;
    }

    match resolution {
        Resolution::Extracted(r) => debug!(
            "Transaction {}: added {} to unit {} (card {:?})",
            tx.id, amount, unit, r.secondary_token
        ),
        Resolution::Excluded(_) => debug!(
            "Transaction {}: added {} to unit {} via exclusion",
            tx.id, amount, unit
        ),
    }

    Ok(())
}

/// Finds the unit of a transaction from its comment or the exclusion table.
///
/// A transaction that has neither gets a placeholder exclusion under unit 0.
fn resolve<S: ExclusionStore + ?Sized>(tx: &Transaction, store: &mut S) -> Result<Resolution> {
    if let Ok(reference) = extractor::extract(&tx.comment) {
        return Ok(Resolution::Extracted(reference));
    }

    if let Some(exclusion) = store.lookup(&tx.id)? {
        return Ok(Resolution::Excluded(exclusion.unit_reference()));
    }

    error!(
        "Invalid comment: {:?} tr: {}, amount: {}",
        tx.comment,
        tx.id,
        whole_units(tx.amount)
    );

    let placeholder = Exclusion::placeholder(tx);
    let reference = placeholder.unit_reference();
    store.append(placeholder)?;
    Ok(Resolution::Excluded(reference))
}
