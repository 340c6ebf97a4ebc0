//! Claim guard error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::ClaimTarget;

/// Errors that can occur while claiming or releasing for a batch.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The order or payment is already claimed by a live batch.
    /// Double inclusion is always rejected, never silently merged.
    #[error("{target} is already claimed by delivery batch {batch_id}")]
    AlreadyClaimed {
        /// The contested order or payment.
        target: ClaimTarget,
        /// The batch holding the existing claim.
        batch_id: Uuid,
    },

    /// The candidate belongs to a different site than the batch.
    #[error("Site mismatch: batch belongs to {batch_site}, candidate to {candidate_site}")]
    SiteMismatch {
        /// The batch's site.
        batch_site: Uuid,
        /// The candidate's site.
        candidate_site: Uuid,
    },

    /// The candidate is not eligible for inclusion.
    #[error("Not eligible for delivery: {0}")]
    NotEligible(String),

    /// Claims can only change while the batch is a draft.
    #[error("Delivery batch is not in draft state")]
    BatchNotDraft,
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyClaimed { .. } => "ALREADY_CLAIMED",
            Self::SiteMismatch { .. } => "SITE_MISMATCH",
            Self::NotEligible(_) => "NOT_ELIGIBLE",
            Self::BatchNotDraft => "BATCH_NOT_DRAFT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyClaimed { .. } => 409,
            Self::SiteMismatch { .. } | Self::NotEligible(_) | Self::BatchNotDraft => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ReconciliationError::AlreadyClaimed {
            target: ClaimTarget::CashOrder(Uuid::nil()),
            batch_id: Uuid::nil(),
        };
        assert_eq!(err.error_code(), "ALREADY_CLAIMED");
        assert_eq!(err.http_status_code(), 409);

        assert_eq!(
            ReconciliationError::BatchNotDraft.error_code(),
            "BATCH_NOT_DRAFT"
        );
        assert_eq!(ReconciliationError::BatchNotDraft.http_status_code(), 422);
    }

    #[test]
    fn test_already_claimed_display() {
        let order = Uuid::nil();
        let batch = Uuid::nil();
        let err = ReconciliationError::AlreadyClaimed {
            target: ClaimTarget::CashOrder(order),
            batch_id: batch,
        };
        assert_eq!(
            err.to_string(),
            format!("order {order} is already claimed by delivery batch {batch}")
        );
    }
}
