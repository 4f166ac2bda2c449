use super::payment::PaymentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("validation: {0}")]
    Validation(String),

    /// Malformed and merely-wrong signatures are deliberately the same error.
    #[error("invalid signature")]
    SignatureInvalid,

    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Money moved but the booking could not be updated. The capture
    /// transaction is rolled back and the failure surfaces to an operator.
    #[error("booking update failed: {0}")]
    BookingUpdateFailed(String),

    #[error("payment not found")]
    NotFound,

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
