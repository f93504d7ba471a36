use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Input validation failed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No ledger row for the order
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Action illegal for the current transaction state
    #[error("Invalid transaction state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Monetary amount invalid
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Gateway API failure (transport, auth, malformed response)
    #[error("Gateway API error: {0}")]
    GatewayError(String),

    /// Order store collaborator failure
    #[error("Order store error: {0}")]
    OrderStoreError(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Crate-wide result type.
pub type DomainResult<T> = Result<T, DomainError>;
