use thiserror::Error;

/// Engine-wide error types for the Solstice protocol.
///
/// Every failure is surfaced synchronously to the caller and leaves the
/// engine with no partial mutation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A non-operator attempted an administrative operation, or a caller
    /// attempted an operation reserved for another account.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid input: fee above its cap, weight allocation over the cap,
    /// duplicate token registration, malformed batch.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not permitted in the current state: withdrawing more than
    /// staked, depositing into a third-party pool, minting on a regular pool.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Referenced pool or resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token collaborator rejected a transfer or mint (insufficient
    /// balance, allowance, or supply cap).
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}
