use sprout_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Operation referenced a message id that does not exist. Surfaced
    /// explicitly instead of the silent no-op it would otherwise mask.
    #[error("message not found: {0}")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an account for '{0}' already exists")]
    DuplicateAccount(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
