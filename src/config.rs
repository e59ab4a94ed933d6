//! Persisted configuration: API token, jar selection, reporting period and
//! the exclusion table.

use crate::error::{LedgerError, Result};
use crate::exclusion::Exclusion;
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layout of `jarStart`, minus the trailing zone abbreviation.
const JAR_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Zone abbreviation after the offset: a name (`EEST`) or, for zones
/// without one, a short numeric form (`+03`, `-0430`).
static ZONE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z]+|[+-][0-9]{2}(?:[0-9]{2})?)$")
        .expect("zone abbreviation pattern is valid")
});

/// Layout of ledger sheet names.
const SHEET_NAME_FORMAT: &str = "%Y-%m-%d";

/// The JSON configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Personal API token
    pub x_token: String,

    /// Title of the jar whose statement is reconciled
    pub jar_name: String,

    /// Start of the reporting period, e.g. `2024-06-25 11:00:00 +0300 EEST`
    pub jar_start: String,

    /// Manual overrides for transactions whose comment has no unit
    pub exclusions: Vec<Exclusion>,
}

impl Config {
    /// Reads the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes the configuration file, pretty-printed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Parses `jar_start` into an instant.
    pub fn window_start(&self) -> Result<DateTime<FixedOffset>> {
        parse_jar_start(&self.jar_start)
    }

    /// Name of the ledger sheet for the configured reporting period.
    pub fn sheet_name(&self) -> Result<String> {
        Ok(self.window_start()?.format(SHEET_NAME_FORMAT).to_string())
    }

    /// `window_start` converted to UTC.
    pub fn window_start_utc(&self) -> Result<DateTime<Utc>> {
        Ok(self.window_start()?.with_timezone(&Utc))
    }
}

/// Adds an exclusion to the configuration file unless one already exists for
/// the same transaction.
pub fn add_exclusion(path: impl AsRef<Path>, exclusion: Exclusion) -> Result<()> {
    let path = path.as_ref();
    let mut config = Config::load(path)?;

    if config
        .exclusions
        .iter()
        .any(|e| e.transaction_id == exclusion.transaction_id)
    {
        return Ok(());
    }

    config.exclusions.push(exclusion);
    config.save(path)
}

fn parse_jar_start(value: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(sheet_error(value, "jar start is empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    let full = match DateTime::parse_from_str(trimmed, JAR_START_FORMAT) {
        Ok(dt) => return Ok(dt),
        Err(e) => e,
    };

    // Go-style timestamps end with a zone abbreviation that carries no offset.
    match trimmed.rsplit_once(' ') {
        Some((head, tail)) if ZONE_ABBREVIATION.is_match(tail) => {
            DateTime::parse_from_str(head, JAR_START_FORMAT)
                .map_err(|e| sheet_error(value, &e.to_string()))
        }
        _ => Err(sheet_error(value, &full.to_string())),
    }
}

fn sheet_error(value: &str, message: &str) -> LedgerError {
    LedgerError::SheetResolution {
        value: value.to_string(),
        message: message.to_string(),
    }
}
