// error.rs
// Error taxonomy shared by the ledger core, the stores and the HTTP layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range arguments; nothing was persisted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Unknown user and wrong password both end up here.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::InvalidInput(msg.into())
    }
}

impl From<mongodb::error::Error> for LedgerError {
    fn from(err: mongodb::error::Error) -> Self {
        LedgerError::StorageUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
