//! Claim guard service.
//!
//! The repository layer feeds this service the live claims it finds by
//! querying existing delivery line items inside the claiming
//! transaction; partial unique indexes on the line item table back the
//! same guarantee for concurrent writers.

use uuid::Uuid;

use super::error::ReconciliationError;
use super::types::{CandidateOrder, CandidatePayment, ClaimTarget, ExistingClaim};
use crate::credit::types::{OrderKind, OrderStatus};
use crate::delivery::types::DeliveryStatus;

/// Stateless service enforcing at-most-once inclusion.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Returns the live claim on a target, if any.
    #[must_use]
    pub fn find_claim(target: ClaimTarget, existing: &[ExistingClaim]) -> Option<&ExistingClaim> {
        existing.iter().find(|claim| claim.target == target)
    }

    /// Returns true if any live batch claims the target.
    #[must_use]
    pub fn is_claimed(target: ClaimTarget, existing: &[ExistingClaim]) -> bool {
        Self::find_claim(target, existing).is_some()
    }

    /// Checks that a cash order can be claimed by a draft batch.
    ///
    /// # Errors
    ///
    /// - `NotEligible` for credit-kind or non-finalized orders
    /// - `SiteMismatch` for cross-site claims
    /// - `AlreadyClaimed` when any live line item references the order,
    ///   including one in the claiming batch itself
    pub fn ensure_claimable_order(
        order: &CandidateOrder,
        batch_site: Uuid,
        existing: &[ExistingClaim],
    ) -> Result<(), ReconciliationError> {
        if order.kind != OrderKind::Cash {
            return Err(ReconciliationError::NotEligible(format!(
                "order {} is a credit sale; claim its installments instead",
                order.id
            )));
        }
        if order.status != OrderStatus::Finalized {
            return Err(ReconciliationError::NotEligible(format!(
                "order {} is {}, only finalized orders are deliverable",
                order.id, order.status
            )));
        }
        if order.site_id != batch_site {
            return Err(ReconciliationError::SiteMismatch {
                batch_site,
                candidate_site: order.site_id,
            });
        }
        Self::ensure_unclaimed(ClaimTarget::CashOrder(order.id), existing)
    }

    /// Checks that an installment payment can be claimed by a draft batch.
    ///
    /// # Errors
    ///
    /// - `SiteMismatch` for cross-site claims
    /// - `AlreadyClaimed` when any live line item references the payment
    pub fn ensure_claimable_payment(
        payment: &CandidatePayment,
        batch_site: Uuid,
        existing: &[ExistingClaim],
    ) -> Result<(), ReconciliationError> {
        if payment.site_id != batch_site {
            return Err(ReconciliationError::SiteMismatch {
                batch_site,
                candidate_site: payment.site_id,
            });
        }
        Self::ensure_unclaimed(ClaimTarget::Installment(payment.id), existing)
    }

    /// Checks that a batch may still add or release claims.
    ///
    /// # Errors
    ///
    /// Returns `BatchNotDraft` once the batch is confirmed.
    pub fn ensure_mutable(status: DeliveryStatus) -> Result<(), ReconciliationError> {
        if status == DeliveryStatus::Draft {
            Ok(())
        } else {
            Err(ReconciliationError::BatchNotDraft)
        }
    }

    fn ensure_unclaimed(
        target: ClaimTarget,
        existing: &[ExistingClaim],
    ) -> Result<(), ReconciliationError> {
        match Self::find_claim(target, existing) {
            Some(claim) => Err(ReconciliationError::AlreadyClaimed {
                target,
                batch_id: claim.batch_id,
            }),
            None => Ok(()),
        }
    }
}
