//! Payment error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::credit::error::CreditError;

/// Errors that can occur while registering or amending a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Receipt reference was supplied but blank.
    #[error("Receipt reference cannot be blank")]
    BlankReceiptRef,

    /// The payment is locked inside a confirmed delivery batch.
    #[error("Payment {0} is claimed by a confirmed delivery and cannot be amended")]
    PaymentClaimed(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Balance arithmetic rejected the payment.
    #[error(transparent)]
    Credit(#[from] CreditError),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) | Self::BlankReceiptRef => "VALIDATION_ERROR",
            Self::PaymentClaimed(_) => "PAYMENT_CLAIMED",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Credit(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::BlankReceiptRef => 400,
            Self::PaymentClaimed(_) => 409,
            Self::PaymentNotFound(_) => 404,
            Self::Credit(err) => err.http_status_code(),
        }
    }
}
