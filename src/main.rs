//! Jar Ledger CLI
//!
//! Reconciles a jar statement dump into the ledger directory, once or on a
//! fixed interval.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- config.json statement.json ledger/
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `JAR_LEDGER_INTERVAL_SECS`: Keep running and sync every N seconds

use jar_ledger::service::run_cycle;
use jar_ledger::{JsonDumpSource, LedgerError, Result};
use log::{error, info};
use std::env;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

const INTERVAL_VAR: &str = "JAR_LEDGER_INTERVAL_SECS";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(LedgerError::MissingArgument);
    }

    let config_path = PathBuf::from(&args[1]);
    let source = JsonDumpSource::new(&args[2]);
    let ledger_dir = PathBuf::from(&args[3]);

    let Some(interval) = interval()? else {
        run_cycle(&config_path, &ledger_dir, &source)?;
        return Ok(());
    };

    info!("Syncing every {}s", interval.as_secs());
    loop {
        // A failed cycle is retried on the next tick.
        if let Err(e) = run_cycle(&config_path, &ledger_dir, &source) {
            error!("Sync cycle failed: {}", e);
        }
        thread::sleep(interval);
    }
}

fn interval() -> Result<Option<Duration>> {
    let Ok(raw) = env::var(INTERVAL_VAR) else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(LedgerError::InvalidArgument(format!(
            "{} must be a positive number of seconds, got {:?}",
            INTERVAL_VAR, raw
        ))),
    }
}
