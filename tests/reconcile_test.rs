//! Reconciliation scenarios against a config-file exclusion table.

use jar_ledger::{reconcile, Config, ConfigExclusionStore, Exclusion, Ledger, Transaction};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const JAR_START: &str = "2024-06-25 11:00:00 +0300 EEST";

fn setup_config(dir: &TempDir, exclusions: Vec<Exclusion>) -> PathBuf {
    let path = dir.path().join("conf.json");
    Config {
        jar_start: JAR_START.to_string(),
        exclusions,
        ..Default::default()
    }
    .save(&path)
    .unwrap();
    path
}

fn sequential_batch(range: std::ops::Range<i64>, id_factor: i64) -> Vec<Transaction> {
    range
        .map(|i| Transaction::new((i * id_factor).to_string(), format!("{} {}", i, i * 50), i * 1000))
        .collect()
}

fn invalid_comment_batch() -> Vec<Transaction> {
    vec![
        Transaction::new("10", "24 4441166661984104", 100_000),
        Transaction::new("11", "", 110_000),
        Transaction::new("12", "144", 120_000),
        Transaction::new("14", "", 130_000),
    ]
}

fn run_pass(ledger: &mut Ledger, txs: &[Transaction], config_path: &Path) {
    let mut store = ConfigExclusionStore::new(config_path);
    reconcile(ledger, txs, &mut store).unwrap();
    ledger.sort_by_unit();
}

fn row_cells(ledger: &Ledger, pos: usize) -> (u32, i64, String) {
    let row = &ledger.rows()[pos];
    (row.unit, row.amount, row.joined_ids())
}

#[test]
fn test_new_sheet_one_row_per_unit() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = setup_config(&dir, Vec::new());
    let sheet_name = Config::load(&config_path).unwrap().sheet_name().unwrap();

    let mut ledger = Ledger::new(sheet_name);
    let mut store = ConfigExclusionStore::new(&config_path);
    reconcile(&mut ledger, &sequential_batch(0..10, 1), &mut store).unwrap();

    assert_eq!(ledger.name(), "2024-06-25");
    assert_eq!(ledger.len(), 10);
    for (i, row) in ledger.rows().iter().enumerate() {
        assert_eq!(row.unit as usize, i);
        assert_eq!(row.amount, i as i64 * 10);
        assert_eq!(row.joined_ids(), i.to_string());
    }

    assert!(Config::load(&config_path).unwrap().exclusions.is_empty());
}

#[test]
fn test_existing_sheet_overlapping_units() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = setup_config(&dir, Vec::new());

    let mut ledger = Ledger::new("2024-06-25");
    run_pass(&mut ledger, &sequential_batch(0..10, 1), &config_path);
    run_pass(&mut ledger, &sequential_batch(5..15, 2), &config_path);

    assert_eq!(ledger.len(), 15);
    for (i, row) in ledger.rows().iter().enumerate() {
        let i = i as i64;
        assert_eq!(row.unit as i64, i);

        if i < 5 {
            assert_eq!(row.amount, i * 10);
            assert_eq!(row.joined_ids(), i.to_string());
        } else if i >= 10 {
            assert_eq!(row.amount, i * 10);
            assert_eq!(row.joined_ids(), (i * 2).to_string());
        } else {
            assert_eq!(row.amount, i * 10 * 2);
            assert_eq!(row.joined_ids(), format!("{},{}", i, i * 2));
        }
    }
}

#[test]
fn test_reconciling_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = setup_config(&dir, Vec::new());
    let mut txs = sequential_batch(1..6, 1);
    txs.extend(invalid_comment_batch());

    let mut once = Ledger::new("p");
    run_pass(&mut once, &txs, &config_path);
    let exclusions_after_once = Config::load(&config_path).unwrap().exclusions;

    let mut twice = once.clone();
    run_pass(&mut twice, &txs, &config_path);

    assert_eq!(once.rows(), twice.rows());
    assert_eq!(
        Config::load(&config_path).unwrap().exclusions,
        exclusions_after_once
    );
}

#[test]
fn test_invalid_comments_go_to_unit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = setup_config(&dir, Vec::new());
    let txs = invalid_comment_batch();

    let mut ledger = Ledger::new("p");
    run_pass(&mut ledger, &txs, &config_path);

    assert_eq!(ledger.len(), txs.len() - 1);
    assert_eq!(row_cells(&ledger, 0), (0, 2400, "11,14".to_string()));
    assert_eq!(row_cells(&ledger, 1), (24, 1000, "10".to_string()));
    assert_eq!(row_cells(&ledger, 2), (144, 1200, "12".to_string()));

    let exclusions = Config::load(&config_path).unwrap().exclusions;
    assert_eq!(exclusions.len(), 2);
    assert_eq!(exclusions[0].transaction_id, "11");
    assert_eq!(exclusions[0].unit, 0);
    assert_eq!(exclusions[0].amount, 1100);
    assert_eq!(exclusions[1].transaction_id, "14");
}

#[test]
fn test_assigned_exclusion_moves_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = setup_config(&dir, Vec::new());
    let txs = invalid_comment_batch();

    let mut ledger = Ledger::new("p");
    run_pass(&mut ledger, &txs, &config_path);

    // Operator rewrites the table, assigning transaction 11 to apartment 144.
    setup_config(&dir, vec![Exclusion::new("11", 144, "", "", 0)]);
    run_pass(&mut ledger, &txs, &config_path);

    assert_eq!(ledger.len(), txs.len() - 1);
    assert_eq!(row_cells(&ledger, 0), (0, 1300, "14".to_string()));
    assert_eq!(row_cells(&ledger, 1), (24, 1000, "10".to_string()));
    assert_eq!(row_cells(&ledger, 2), (144, 2300, "12,11".to_string()));

    // 14 had no entry after the rewrite and gets its placeholder back.
    let exclusions = Config::load(&config_path).unwrap().exclusions;
    assert_eq!(exclusions.len(), 2);
    assert_eq!(exclusions[1].transaction_id, "14");
    assert_eq!(exclusions[1].unit, 0);
}

#[test]
fn test_missing_config_aborts_pass() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ConfigExclusionStore::new(dir.path().join("absent.json"));

    let mut ledger = Ledger::new("p");
    let err = reconcile(&mut ledger, &invalid_comment_batch(), &mut store).unwrap_err();

    assert!(err.to_string().contains("absent.json"));
    assert!(ledger.is_empty());
}
