//! Error types for the ledger reconciler.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while syncing a statement into the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open, read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sheet CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration or statement JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The exclusion table could not be read or updated
    #[error("Exclusion store error at {path}: {source}")]
    ExclusionStore {
        path: String,
        #[source]
        source: Box<LedgerError>,
    },

    /// The reporting period name could not be derived from the config
    #[error("Cannot resolve sheet name from jar start {value:?}: {message}")]
    SheetResolution { value: String, message: String },

    /// No jar with the configured title exists for the client
    #[error("Jar not found: {0}")]
    JarNotFound(String),

    /// Invalid value supplied on the command line or in the environment
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing positional arguments
    #[error(
        "Missing arguments. Usage: jar-ledger <config.json> <statement.json> <ledger-dir>"
    )]
    MissingArgument,
}
