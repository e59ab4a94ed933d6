//! Statement source models and the seam to the bank API.
//!
//! Field names follow the bank's personal API so that dumps of
//! `client-info` and `statement` responses deserialize directly.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// A single statement entry.
///
/// Only `id`, `comment` and `amount` matter to reconciliation; the rest is
/// carried so that dumps survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// Stable identifier, unique within the account
    pub id: String,

    /// Unix timestamp, seconds
    pub time: i64,

    pub description: String,

    pub mcc: i32,

    pub hold: bool,

    /// Signed amount in minor currency units (kopecks, cents)
    pub amount: i64,

    pub operation_amount: i64,

    pub currency_code: i32,

    pub balance: i64,

    /// Free-text payer comment, where the unit number lives
    pub comment: String,

    pub counter_name: String,
}

impl Transaction {
    /// Minimal transaction with the fields reconciliation reads.
    pub fn new(id: impl Into<String>, comment: impl Into<String>, amount: i64) -> Self {
        Transaction {
            id: id.into(),
            comment: comment.into(),
            amount,
            ..Default::default()
        }
    }

    /// Returns `true` for money leaving the jar.
    pub fn is_withdrawal(&self) -> bool {
        self.amount < 0
    }
}

/// A savings jar of the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Jar {
    pub id: String,
    pub send_id: String,
    pub title: String,
    pub description: String,
    pub currency_code: i32,
    pub balance: i64,
    pub goal: i64,
}

/// A card or current account of the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: String,
    pub balance: i64,
    pub currency_code: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub iban: String,
}

/// Client info: who the token belongs to and which accounts and jars they own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub client_id: String,
    pub name: String,
    pub accounts: Vec<Account>,
    pub jars: Vec<Jar>,
}

/// Finds a jar by its title.
pub fn find_jar<'a>(title: &str, jars: &'a [Jar]) -> Option<&'a Jar> {
    jars.iter().find(|jar| jar.title == title)
}

/// Where statements come from.
pub trait StatementSource {
    /// Fetches the client's accounts and jars.
    fn client_info(&self, token: &str) -> Result<Client>;

    /// Fetches the transactions of one account or jar within `[from, to]`.
    fn statement(
        &self,
        token: &str,
        account_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Dump {
    client: Client,
    statements: HashMap<String, Vec<Transaction>>,
}

/// Statement source backed by a JSON dump of API responses.
///
/// The file has the shape `{"client": {..}, "statements": {"<id>": [..]}}`
/// and is re-read on every call, so an external fetcher may refresh it
/// between cycles.
#[derive(Debug, Clone)]
pub struct JsonDumpSource {
    path: PathBuf,
}

impl JsonDumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonDumpSource { path: path.into() }
    }

    fn load(&self) -> Result<Dump> {
        let file = File::open(&self.path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl StatementSource for JsonDumpSource {
    fn client_info(&self, _token: &str) -> Result<Client> {
        Ok(self.load()?.client)
    }

    fn statement(
        &self,
        _token: &str,
        account_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut dump = self.load()?;
        let transactions = dump.statements.remove(account_id).unwrap_or_default();

        let (from, to) = (from.timestamp(), to.timestamp());
        Ok(transactions
            .into_iter()
            .filter(|tx| tx.time >= from && tx.time <= to)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use chrono::TimeZone;
    use std::io::Write;

    const DUMP: &str = r#"{
        "client": {
            "clientId": "abc",
            "name": "House 7",
            "jars": [
                {"id": "jar-1", "title": "Repairs", "currencyCode": 980, "balance": 500000, "goal": 0},
                {"id": "jar-2", "title": "Elevator", "currencyCode": 980, "balance": 0, "goal": 0}
            ]
        },
        "statements": {
            "jar-1": [
                {"id": "a", "time": 1719300000, "amount": 10000, "comment": "12"},
                {"id": "b", "time": 1719400000, "amount": -5000, "description": "withdrawal"},
                {"id": "c", "time": 1719500000, "amount": 20000, "comment": "14 5168"}
            ]
        }
    }"#;

    fn dump_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_find_jar_by_title() {
        let file = dump_file();
        let source = JsonDumpSource::new(file.path());
        let client = source.client_info("token").unwrap();

        assert_eq!(client.name, "House 7");
        assert_eq!(find_jar("Elevator", &client.jars).unwrap().id, "jar-2");
        assert!(find_jar("Roof", &client.jars).is_none());
    }

    #[test]
    fn test_statement_window_is_inclusive() {
        let file = dump_file();
        let source = JsonDumpSource::new(file.path());
        let from = Utc.timestamp_opt(1719400000, 0).unwrap();
        let to = Utc.timestamp_opt(1719500000, 0).unwrap();

        let txs = source.statement("token", "jar-1", from, to).unwrap();
        let ids: Vec<_> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(txs[0].is_withdrawal());
        assert_eq!(txs[1].comment, "14 5168");
    }

    #[test]
    fn test_account_without_statement_is_empty() {
        let file = dump_file();
        let source = JsonDumpSource::new(file.path());
        let from = Utc.timestamp_opt(0, 0).unwrap();

        let txs = source.statement("token", "jar-2", from, Utc::now()).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn test_missing_dump_file() {
        let source = JsonDumpSource::new("/nonexistent/statement.json");
        assert!(matches!(
            source.client_info("token"),
            Err(LedgerError::Io(_))
        ));
    }
}
