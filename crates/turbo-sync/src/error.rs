//! Sync error types.

use crate::catalog::CatalogError;
use thiserror::Error;
use turbo_commerce::CommerceError;
use turbo_db::DbError;

/// Errors surfaced by the sync job and the subscription operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Another run is in progress or has just finished.
    #[error("Sync already in progress: {0}")]
    Conflict(String),

    /// Domain rule violation (unknown product, invalid email, ...).
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Storage failure.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Remote catalog failure.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Settings failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// True when the caller should answer 409.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SyncError::Conflict(_) | SyncError::Commerce(CommerceError::VariantAvailable { .. })
        )
    }

    /// True when the caller supplied bad input.
    pub fn is_client_error(&self) -> bool {
        match self {
            SyncError::Commerce(e) => !matches!(e, CommerceError::VariantAvailable { .. }),
            _ => false,
        }
    }
}
