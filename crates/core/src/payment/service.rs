//! Payment registration service.

use rust_decimal::Decimal;

use super::error::PaymentError;
use super::types::{PaymentInput, PaymentSnapshot};
use crate::credit::service::CreditService;
use crate::credit::types::{CreditSnapshot, PaymentOutcome};

/// Stateless service validating installments before they touch a credit.
pub struct PaymentService;

impl PaymentService {
    /// Validates a payment input before any mutation.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` when the amount is zero or negative
    /// - `BlankReceiptRef` when a receipt reference is supplied but blank
    pub fn validate(input: &PaymentInput) -> Result<(), PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(input.amount));
        }
        if let Some(receipt) = &input.receipt_ref
            && receipt.trim().is_empty()
        {
            return Err(PaymentError::BlankReceiptRef);
        }
        Ok(())
    }

    /// Validates and settles one payment against a credit.
    ///
    /// `paid_total` is the authoritative sum of existing payment rows.
    /// The returned outcome carries the balance snapshot the repository
    /// stores on the payment row.
    ///
    /// # Errors
    ///
    /// Validation errors from [`Self::validate`], or credit errors from
    /// the balance recomputation.
    pub fn register(
        credit: &CreditSnapshot,
        paid_total: Decimal,
        input: &PaymentInput,
    ) -> Result<PaymentOutcome, PaymentError> {
        Self::validate(input)?;
        Ok(CreditService::settle_payment(credit, paid_total, input.amount)?)
    }

    /// Validates a corrective amendment of an existing payment.
    ///
    /// Amendments re-trigger the full balance recomputation; a payment
    /// locked inside a confirmed delivery batch can no longer change.
    ///
    /// # Errors
    ///
    /// - `PaymentClaimed` when a confirmed batch owns the payment
    /// - `InvalidAmount` when the new amount is not positive
    pub fn validate_amendment(
        payment: &PaymentSnapshot,
        new_amount: Decimal,
    ) -> Result<(), PaymentError> {
        if payment.claimed_by_confirmed_batch {
            return Err(PaymentError::PaymentClaimed(payment.id));
        }
        if new_amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(new_amount));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::credit::types::{CreditStatus, PaymentMethod};

    fn input(amount: Decimal) -> PaymentInput {
        PaymentInput {
            amount,
            paid_on: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            method: PaymentMethod::Cash,
            receipt_ref: None,
        }
    }

    fn credit(total: Decimal) -> CreditSnapshot {
        CreditSnapshot {
            id: Uuid::new_v4(),
            status: CreditStatus::Open,
            credit_total: total,
            source_withholding: Decimal::ZERO,
            ica_withholding: Decimal::ZERO,
        }
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(PaymentService::validate(&input(dec!(1000))).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        assert!(matches!(
            PaymentService::validate(&input(Decimal::ZERO)),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        assert!(matches!(
            PaymentService::validate(&input(dec!(-100))),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_receipt() {
        let mut payment = input(dec!(1000));
        payment.receipt_ref = Some("   ".to_string());
        assert!(matches!(
            PaymentService::validate(&payment),
            Err(PaymentError::BlankReceiptRef)
        ));
    }

    #[test]
    fn test_register_applies_balance() {
        let outcome =
            PaymentService::register(&credit(dec!(500000)), Decimal::ZERO, &input(dec!(200000)))
                .unwrap();
        assert_eq!(outcome.pending_balance, dec!(300000.00));
        assert!(!outcome.closes_credit);
    }

    #[test]
    fn test_register_propagates_overpayment() {
        let result =
            PaymentService::register(&credit(dec!(100000)), dec!(90000), &input(dec!(20000)));
        assert!(matches!(
            result,
            Err(PaymentError::Credit(
                crate::credit::error::CreditError::OverpaymentRejected { .. }
            ))
        ));
    }

    #[test]
    fn test_amendment_rejected_when_claimed() {
        let snapshot = PaymentSnapshot {
            id: Uuid::new_v4(),
            amount: dec!(1000),
            claimed_by_confirmed_batch: true,
        };
        assert!(matches!(
            PaymentService::validate_amendment(&snapshot, dec!(2000)),
            Err(PaymentError::PaymentClaimed(_))
        ));
    }

    #[test]
    fn test_amendment_allowed_when_unclaimed() {
        let snapshot = PaymentSnapshot {
            id: Uuid::new_v4(),
            amount: dec!(1000),
            claimed_by_confirmed_batch: false,
        };
        assert!(PaymentService::validate_amendment(&snapshot, dec!(2000)).is_ok());
    }
}
