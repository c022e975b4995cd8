use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Low-level cause behind a storage read or write failure
#[derive(Debug, Error)]
pub enum StorageFault {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("could not read contacts from {}: {source}", .path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: StorageFault,
    },

    #[error("could not write contacts to {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: StorageFault,
    },

    #[error("a contact named '{0}' already exists")]
    DuplicateName(String),

    #[error("no contact named '{0}'")]
    NameNotFound(String),

    #[error("'{name}' already has the number {number}")]
    DuplicateNumber { name: String, number: String },

    #[error("{0} must not be blank")]
    Blank(&'static str),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid amount '{0}': expected a non-negative number")]
    InvalidAmount(String),

    #[error(
        "invalid category '{0}': expected one of Food, Transportation, Utilities, Entertainment, Others"
    )]
    InvalidCategory(String),

    #[error("could not read expense data {}: {source}", .path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: StorageFault,
    },

    #[error("could not write expense data {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: StorageFault,
    },

    #[error("expense database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ContactError {
    /// True for conditions the caller caused and can correct (bad input, duplicates)
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ContactError::StorageRead { .. } | ContactError::StorageWrite { .. }
        )
    }
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_) | LedgerError::InvalidCategory(_)
        )
    }
}
