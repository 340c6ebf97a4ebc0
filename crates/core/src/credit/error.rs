//! Credit error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during credit operations.
#[derive(Debug, Error)]
pub enum CreditError {
    /// The order or credit is in a lifecycle state incompatible with the
    /// requested operation.
    #[error("Invalid order state: {0}")]
    InvalidOrderState(String),

    /// The payment would drive the pending balance negative beyond the
    /// monetary epsilon. Policy: rejected, never clamped.
    #[error("Payment of {attempted} exceeds pending balance {pending}")]
    OverpaymentRejected {
        /// Pending balance before the payment.
        pending: Decimal,
        /// Attempted payment amount.
        attempted: Decimal,
    },

    /// A withholding amount was supplied while its flag is disabled.
    #[error("Invalid withholding: {0}")]
    InvalidWithholding(String),

    /// The credit is voided; its balance is frozen.
    #[error("Credit {0} is voided")]
    CreditVoided(Uuid),

    /// Credit not found.
    #[error("Credit not found: {0}")]
    CreditNotFound(Uuid),
}

impl CreditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidOrderState(_) => "INVALID_ORDER_STATE",
            Self::OverpaymentRejected { .. } => "OVERPAYMENT_REJECTED",
            Self::InvalidWithholding(_) => "INVALID_WITHHOLDING",
            Self::CreditVoided(_) => "CREDIT_VOIDED",
            Self::CreditNotFound(_) => "CREDIT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidOrderState(_)
            | Self::OverpaymentRejected { .. }
            | Self::InvalidWithholding(_)
            | Self::CreditVoided(_) => 422,
            Self::CreditNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CreditError::InvalidOrderState("x".into()).error_code(),
            "INVALID_ORDER_STATE"
        );
        assert_eq!(
            CreditError::OverpaymentRejected {
                pending: dec!(100),
                attempted: dec!(200),
            }
            .error_code(),
            "OVERPAYMENT_REJECTED"
        );
        assert_eq!(
            CreditError::InvalidWithholding("x".into()).error_code(),
            "INVALID_WITHHOLDING"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            CreditError::CreditNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            CreditError::CreditVoided(Uuid::nil()).http_status_code(),
            422
        );
    }

    #[test]
    fn test_overpayment_display() {
        let err = CreditError::OverpaymentRejected {
            pending: dec!(600000),
            attempted: dec!(700000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of 700000 exceeds pending balance 600000"
        );
    }
}
