use thiserror::Error;

/// Outcome kinds surfaced by store operations.
///
/// `InvalidInput` and `AccessDenied` carry a human-readable reason and are
/// always raised before anything is mutated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn access(reason: impl Into<String>) -> Self {
        Self::AccessDenied(reason.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
