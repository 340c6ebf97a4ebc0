//! Delivery batch error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during delivery batch operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A batch with no line items and no expenses cannot be confirmed.
    #[error("Delivery batch has no line items and no expenses")]
    EmptyBatch,

    /// The batch was already confirmed; confirmation is terminal.
    #[error("Delivery batch is already confirmed")]
    AlreadyConfirmed,

    /// The operation requires a draft batch.
    #[error("Delivery batch is not in draft state")]
    BatchNotDraft,

    /// Batch not found.
    #[error("Delivery batch not found: {0}")]
    BatchNotFound(Uuid),
}

impl DeliveryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::AlreadyConfirmed => "ALREADY_CONFIRMED",
            Self::BatchNotDraft => "BATCH_NOT_DRAFT",
            Self::BatchNotFound(_) => "BATCH_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyBatch | Self::BatchNotDraft => 422,
            Self::AlreadyConfirmed => 409,
            Self::BatchNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DeliveryError::EmptyBatch.error_code(), "EMPTY_BATCH");
        assert_eq!(
            DeliveryError::AlreadyConfirmed.error_code(),
            "ALREADY_CONFIRMED"
        );
        assert_eq!(DeliveryError::BatchNotDraft.error_code(), "BATCH_NOT_DRAFT");
        assert_eq!(
            DeliveryError::BatchNotFound(Uuid::nil()).error_code(),
            "BATCH_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(DeliveryError::EmptyBatch.http_status_code(), 422);
        assert_eq!(DeliveryError::AlreadyConfirmed.http_status_code(), 409);
        assert_eq!(
            DeliveryError::BatchNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }
}
