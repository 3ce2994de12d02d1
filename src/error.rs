use std::io;
use thiserror::Error;

/// Result type for vap3 operations
pub type Result<T> = std::result::Result<T, Vap3Error>;

/// Unified error type for all vap3 operations
#[derive(Debug, Error)]
pub enum Vap3Error {
    // Archive errors
    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // Metadata errors
    #[error("Archive metadata (metadata.json) not found")]
    MetadataNotFound,

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    // Sheet errors
    #[error("Invalid sheet name: {0:?}")]
    InvalidSheetName(String),

    #[error("Invalid sample id: {0:?}")]
    InvalidSampleId(String),

    #[error("Duplicate sheet name: {0}")]
    DuplicateSheet(String),

    #[error("Row has {actual} cells, expected {expected}")]
    RowWidthMismatch { expected: usize, actual: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(String),

    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Vap3Error {
    fn from(err: toml::de::Error) -> Self {
        Vap3Error::TomlError(err.to_string())
    }
}

impl From<toml::ser::Error> for Vap3Error {
    fn from(err: toml::ser::Error) -> Self {
        Vap3Error::TomlError(err.to_string())
    }
}

impl From<tempfile::PersistError> for Vap3Error {
    fn from(err: tempfile::PersistError) -> Self {
        Vap3Error::Io(err.error)
    }
}
