//! Ledger persistence: a directory of CSV sheets, one per reporting period.
//!
//! Each sheet lives in `<dir>/<sheet name>.csv` with the header
//! `unit,amount,transactionIDs`.

use crate::error::Result;
use crate::ledger::{Ledger, LedgerRow, HEADER};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

const SHEET_EXTENSION: &str = "csv";

/// All ledger sheets, keyed by reporting period name.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: BTreeMap<String, Ledger>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Workbook::default()
    }

    /// Loads every sheet stored in `dir`.
    ///
    /// A missing directory yields an empty workbook.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Ledger directory {} does not exist, creating new", dir.display());
                return Ok(Workbook::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut workbook = Workbook::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SHEET_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let sheet = read_sheet(name, fs::File::open(&path)?)?;
            workbook.sheets.insert(name.to_string(), sheet);
        }

        Ok(workbook)
    }

    /// Writes every sheet into `dir`, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for (name, sheet) in &self.sheets {
            let path = dir.join(format!("{}.{}", name, SHEET_EXTENSION));
            write_sheet(sheet, fs::File::create(path)?)?;
        }
        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Option<&Ledger> {
        self.sheets.get(name)
    }

    /// Returns the named sheet, adding an empty one if it does not exist.
    pub fn sheet_mut(&mut self, name: &str) -> &mut Ledger {
        self.sheets.entry(name.to_string()).or_insert_with(|| {
            info!("Adding sheet: {}", name);
            Ledger::new(name)
        })
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Reads one sheet. Rows that do not parse are logged and skipped.
pub fn read_sheet<R: Read>(name: &str, reader: R) -> Result<Ledger> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.deserialize::<LedgerRow>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Sheet {} row {}: skipping malformed row: {}", name, row_num, e),
        }
    }

    Ok(Ledger::from_rows(name, rows))
}

/// Writes one sheet with its header row.
pub fn write_sheet<W: Write>(sheet: &Ledger, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in sheet.rows() {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
