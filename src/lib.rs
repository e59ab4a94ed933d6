//! # Jar Ledger
//!
//! Reconciles the statement of a savings jar into a per-period ledger,
//! grouping contributions by the apartment number payers write in the
//! payment comment.
//!
//! ## Design Principles
//!
//! - **Idempotent merges**: a transaction id is recorded in exactly one row,
//!   so overlapping statement windows never double-count
//! - **Manual overrides**: comments without a unit fall back to the exclusion
//!   table, where unresolved transactions are recorded for later assignment
//! - **Atomic passes**: a failed pass leaves the in-memory ledger unchanged
//! - **Deterministic output**: rows sorted by unit number
//!
//! ## Example
//!
//! ```
//! use jar_ledger::{reconcile, Exclusion, Ledger, Transaction};
//!
//! let mut ledger = Ledger::new("2024-06-25");
//! let mut exclusions: Vec<Exclusion> = Vec::new();
//! let statement = vec![
//!     Transaction::new("a", "кв. 24 4441", 100_000),
//!     Transaction::new("b", "24", 50_050),
//! ];
//!
//! reconcile(&mut ledger, &statement, &mut exclusions).unwrap();
//! assert_eq!(ledger.find_row(24).unwrap().amount, 1500);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod extractor;
pub mod ledger;
pub mod service;
pub mod statement;
pub mod workbook;

pub use config::Config;
pub use engine::{reconcile, ReconcileSummary};
pub use error::{LedgerError, Result};
pub use exclusion::{ConfigExclusionStore, Exclusion, ExclusionStore};
pub use extractor::{extract, NotFound, UnitReference};
pub use ledger::{Ledger, LedgerRow};
pub use statement::{JsonDumpSource, StatementSource, Transaction};
pub use workbook::Workbook;
