//! Error taxonomy for loading deployment configs.
//!
//! Loading is the only fallible surface: lookups on a loaded catalog return
//! `Option` because a miss is an expected outcome the caller degrades around.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or interpreting a configuration source.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source could not be read from disk.
    #[error("unable to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The source was read but violates the config structure or one of its
    /// invariants. Fatal at startup: the console cannot render without it.
    #[error("malformed config: {0}")]
    MalformedConfig(String),
}

impl CatalogError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CatalogError::MalformedConfig(message.into())
    }

    /// True for structural or invariant violations (as opposed to I/O).
    pub fn is_malformed(&self) -> bool {
        matches!(self, CatalogError::MalformedConfig(_))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::MalformedConfig(err.to_string())
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
