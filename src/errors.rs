use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("No transaction at position {index} (ledger holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Rejections raised while turning raw user input into a transaction.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(f64),
    #[error("date is required")]
    MissingDate,
    #[error("date `{0}` must use the YYYY-MM-DD format")]
    InvalidDate(String),
    #[error("unknown transaction kind `{0}` (expected income or expense)")]
    UnknownKind(String),
}
