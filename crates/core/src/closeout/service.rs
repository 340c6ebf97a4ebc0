//! Closeout service.

use uuid::Uuid;

use super::error::CloseoutError;
use super::types::{CloseoutCandidate, CloseoutRecord, CloseoutSnapshot};

/// Stateless service validating and assembling closeout records.
pub struct CloseoutService;

impl CloseoutService {
    /// Builds a closeout record for a designated client.
    ///
    /// `candidates` are the credits the repository resolved for the
    /// requested ids. Credit state is not altered here or anywhere else
    /// by a closeout; the record is an audit layer only.
    ///
    /// # Errors
    ///
    /// - `EmptyRequest` when no credit ids were requested
    /// - `NotDesignatedClient` when the client is not flagged for bulk
    ///   closeout
    /// - `CreditNotFound` when a requested id has no candidate
    /// - `ForeignCredit` when a credit belongs to another client
    /// - `CreditNotOpen` when a credit is closed or voided
    pub fn build(
        client_id: Uuid,
        client_is_designated: bool,
        performed_by: Uuid,
        notes: Option<String>,
        requested: &[Uuid],
        candidates: &[CloseoutCandidate],
    ) -> Result<CloseoutRecord, CloseoutError> {
        if requested.is_empty() {
            return Err(CloseoutError::EmptyRequest);
        }
        if !client_is_designated {
            return Err(CloseoutError::NotDesignatedClient(client_id));
        }

        let mut items = Vec::with_capacity(requested.len());
        for credit_id in requested {
            let candidate = candidates
                .iter()
                .find(|c| c.credit_id == *credit_id)
                .ok_or(CloseoutError::CreditNotFound(*credit_id))?;

            if candidate.client_id != client_id {
                return Err(CloseoutError::ForeignCredit {
                    credit_id: *credit_id,
                    client_id,
                });
            }
            if !candidate.status.accepts_payments() {
                return Err(CloseoutError::CreditNotOpen(*credit_id));
            }

            items.push(CloseoutSnapshot {
                credit_id: candidate.credit_id,
                order_number: candidate.order_number,
                credit_total: candidate.credit_total,
                prior_balance: candidate.pending_balance,
            });
        }

        Ok(CloseoutRecord {
            client_id,
            performed_by,
            notes,
            items,
        })
    }
}
