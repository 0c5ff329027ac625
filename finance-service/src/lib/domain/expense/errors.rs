use thiserror::Error;

/// Error for Category parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Unknown category: {0}")]
    Unknown(String),
}

/// Top-level error for all expense-related operations
#[derive(Debug, Clone, Error)]
pub enum ExpenseError {
    #[error("Invalid category: {0}")]
    InvalidCategory(#[from] CategoryError),

    #[error("Amount must be greater than 0")]
    InvalidAmount,

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
