//! Overdue transition policy.
//!
//! The overdue rule is pluggable rather than hard-coded: a credit counts
//! as overdue once it has been open longer than the configured grace
//! period. The transition is applied by an explicit sweep, never on read.

use chrono::NaiveDate;

use super::types::CreditStatus;

/// Days-since-opening policy deciding when an open credit turns overdue.
#[derive(Debug, Clone, Copy)]
pub struct OverduePolicy {
    /// Days past opening before an open credit counts as overdue.
    pub grace_days: u32,
}

impl Default for OverduePolicy {
    fn default() -> Self {
        Self { grace_days: 30 }
    }
}

impl OverduePolicy {
    /// Creates a policy with the given grace period.
    #[must_use]
    pub const fn new(grace_days: u32) -> Self {
        Self { grace_days }
    }

    /// Returns true if a credit opened on `opened_on` is overdue as of
    /// `as_of`.
    #[must_use]
    pub fn is_overdue(&self, opened_on: NaiveDate, as_of: NaiveDate) -> bool {
        let elapsed = as_of.signed_duration_since(opened_on).num_days();
        elapsed > i64::from(self.grace_days)
    }

    /// Returns the new status a sweep should apply, if any.
    ///
    /// Only `Open` credits transition; closed, voided, and already
    /// overdue credits are untouched.
    #[must_use]
    pub fn sweep_status(
        &self,
        status: CreditStatus,
        opened_on: NaiveDate,
        as_of: NaiveDate,
    ) -> Option<CreditStatus> {
        if status == CreditStatus::Open && self.is_overdue(opened_on, as_of) {
            Some(CreditStatus::Overdue)
        } else {
            None
        }
    }
}
