//! Centralized error handling for sci-tools.
//!
//! Every fatal condition of the trend-testing pipeline is a variant of
//! [`SciToolsError`]. The binary prints the error and exits with status 1;
//! per-column failures are caught inside the tester and never reach the caller.
//!
//! ## Conversions
//!
//! `From` is implemented for the error types of the crates we call into, so
//! the `?` operator works across module boundaries:
//!
//! ```no_run
//! use sci_tools::error::Result;
//! use std::fs;
//!
//! fn read_settings(path: &str) -> Result<String> {
//!     // std::io::Error converts to SciToolsError::Io
//!     let content = fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```
//!
//! ## Context
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`SciToolsError`]:
//!
//! ```no_run
//! use sci_tools::error::ResultExt as _;
//! use std::fs;
//!
//! fn load() -> sci_tools::error::Result<String> {
//!     fs::read_to_string("data.csv").context("Failed to load dataset")
//! }
//! ```

use std::fmt;

/// Main error type for sci-tools operations.
#[derive(Debug)]
pub enum SciToolsError {
    /// I/O errors (reading the input, writing results)
    Io(std::io::Error),

    /// Data processing errors (Polars, CSV parsing, casting)
    DataProcessing(String),

    /// Invalid settings or settings file
    Config(String),

    /// A required column is not present in the dataset
    MissingColumn(String),

    /// Caller-supplied input that cannot be processed
    InvalidInput(String),

    /// A statistical computation that cannot produce a result
    Computation(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for SciToolsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::MissingColumn(name) => write!(f, "Column '{name}' does not exist"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::Computation(msg) => write!(f, "Computation error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SciToolsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SciToolsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for SciToolsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for SciToolsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for SciToolsError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl SciToolsError {
    /// Process exit status for this error. All fatal errors map to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias for sci-tools operations.
pub type Result<T> = std::result::Result<T, SciToolsError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SciToolsError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap(e.into(), msg.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Keeps the variant so callers can still tell a missing column from a bad file.
fn wrap(err: SciToolsError, msg: String) -> SciToolsError {
    match err {
        SciToolsError::Io(e) => {
            SciToolsError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}")))
        }
        SciToolsError::DataProcessing(inner) => {
            SciToolsError::DataProcessing(format!("{msg}: {inner}"))
        }
        SciToolsError::Config(inner) => SciToolsError::Config(format!("{msg}: {inner}")),
        other => SciToolsError::Other(format!("{msg}: {other}")),
    }
}
