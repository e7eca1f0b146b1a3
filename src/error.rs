//! Error types for boundary loading and indoor lookups.

use std::num::ParseFloatError;
use std::path::PathBuf;

use thiserror::Error;

/// A single malformed coordinate token. Recovered locally: the vertex is
/// dropped and parsing continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("coordinate token {token:?} needs \"longitude,latitude\"")]
    MissingComponent { token: String },

    #[error("coordinate token {token:?} is not numeric: {source}")]
    InvalidNumber {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("coordinate token {token:?} is outside WGS84 range")]
    OutOfRange { token: String },
}

/// A boundary source could not be read. The store keeps its previous
/// snapshot when this is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read boundary source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode boundary records in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk boundary directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("unsupported boundary file {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Indoor details could not be fetched for a place
#[derive(Debug, Error)]
pub enum IndoorError {
    #[error("no indoor details for place {0:?}")]
    UnknownPlace(String),

    #[error("failed to read indoor details {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode indoor details in {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("indoor provider failed: {0}")]
    Provider(String),
}
