//! One sync cycle: fetch the jar statement, reconcile it, persist the ledger.

use crate::config::Config;
use crate::engine::{self, ReconcileSummary};
use crate::error::{LedgerError, Result};
use crate::exclusion::ConfigExclusionStore;
use crate::statement::{find_jar, StatementSource, Transaction};
use crate::workbook::Workbook;
use chrono::Utc;
use log::info;
use std::path::Path;

/// Runs a full fetch → reconcile → persist cycle.
///
/// Nothing is written to the ledger directory unless every step succeeds.
/// Placeholder exclusions may still have been appended to the config file.
pub fn run_cycle<S: StatementSource + ?Sized>(
    config_path: &Path,
    ledger_dir: &Path,
    source: &S,
) -> Result<ReconcileSummary> {
    info!(
        "START processing conf: {}, ledger: {}",
        config_path.display(),
        ledger_dir.display()
    );

    let config = Config::load(config_path)?;
    let sheet_name = config.sheet_name()?;
    let from = config.window_start_utc()?;

    let client = source.client_info(&config.x_token)?;
    let jar = find_jar(&config.jar_name, &client.jars)
        .ok_or_else(|| LedgerError::JarNotFound(config.jar_name.clone()))?;

    let mut transactions = source.statement(&config.x_token, &jar.id, from, Utc::now())?;
    let fetched = transactions.len();
    transactions.retain(|tx| !tx.is_withdrawal());
    info!(
        "Fetched {} transactions for jar {:?}, {} after dropping withdrawals",
        fetched,
        jar.title,
        transactions.len()
    );

    let mut workbook = Workbook::open(ledger_dir)?;
    let summary = reconcile_sheet(&mut workbook, &sheet_name, &transactions, config_path)?;
    workbook.save(ledger_dir)?;

    info!(
        "FINISH processing conf: {}, ledger: {} ({} merged, {} migrated, {} skipped, {} unresolved)",
        config_path.display(),
        ledger_dir.display(),
        summary.merged,
        summary.migrated,
        summary.skipped,
        summary.unresolved
    );
    Ok(summary)
}

/// Reconciles transactions into one sheet of the workbook, then sorts it and
/// drops an empty unresolved row.
pub fn reconcile_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    transactions: &[Transaction],
    config_path: &Path,
) -> Result<ReconcileSummary> {
    let mut store = ConfigExclusionStore::new(config_path);
    let sheet = workbook.sheet_mut(sheet_name);

    let summary = engine::reconcile(sheet, transactions, &mut store)?;
    sheet.sort_by_unit();
    if sheet.prune_zero_row() {
        info!("Sheet {}: removed empty unresolved row", sheet_name);
    }

    Ok(summary)
}
