use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The caller's credit balance cannot cover the requested work.
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: i32, available: i32 },

    /// The analysis adapter errored or returned an unusable response.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// A durable-store or object-store write failed.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// A payment confirmation event failed signature verification.
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
