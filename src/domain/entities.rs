use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{CaptureState, TransactionState};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The ledger row: one per order paid through the gateway.
///
/// Created once by the return handler after the gateway confirms the
/// authorization, mutated only by the dispatcher after a successful gateway
/// call, never deleted. The live gateway transaction stays the amount
/// authority; this row is the local audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Remote gateway transaction id, immutable correlation key
    pub gateway_tid: String,

    /// Owning store order, set at creation
    pub order_id: i64,

    /// Amount recorded at authorization
    pub paid_amount: Decimal,

    /// Running total of refunds applied, never exceeds `paid_amount`
    pub refunded_amount: Decimal,

    /// Transitions NO -> YES exactly once
    pub captured: CaptureState,

    /// Set at creation
    pub paid_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(
        gateway_tid: String,
        order_id: i64,
        paid_amount: Decimal,
        captured: CaptureState,
    ) -> DomainResult<Self> {
        if gateway_tid.is_empty() {
            return Err(DomainError::ValidationError(
                "Gateway transaction id must not be empty".to_string(),
            ));
        }

        if paid_amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(
                "Paid amount must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            gateway_tid,
            order_id,
            paid_amount,
            refunded_amount: Decimal::ZERO,
            captured,
            paid_at: Utc::now(),
        })
    }

    /// Derive the lifecycle state from the stored fields.
    pub fn state(&self) -> TransactionState {
        match self.captured {
            CaptureState::No => TransactionState::Authorized,
            CaptureState::Yes if self.refunded_amount.is_zero() => TransactionState::Captured,
            CaptureState::Yes if self.refunded_amount < self.paid_amount => {
                TransactionState::PartiallyRefunded
            }
            CaptureState::Yes => TransactionState::FullyRefunded,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured == CaptureState::Yes
    }

    /// Mark the transaction captured. Legal exactly once.
    pub fn mark_captured(&mut self) -> DomainResult<()> {
        if self.captured == CaptureState::Yes {
            return Err(DomainError::InvalidState {
                expected: CaptureState::No.to_string(),
                actual: self.captured.to_string(),
            });
        }

        self.captured = CaptureState::Yes;
        Ok(())
    }

    /// Accumulate a refund. Requires a captured transaction and rejects
    /// totals beyond the paid amount.
    pub fn apply_refund(&mut self, amount: Decimal) -> DomainResult<()> {
        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidAmount(
                "Refund amount must not be negative".to_string(),
            ));
        }

        if self.captured == CaptureState::No {
            return Err(DomainError::InvalidState {
                expected: CaptureState::Yes.to_string(),
                actual: self.captured.to_string(),
            });
        }

        if self.refunded_amount + amount > self.paid_amount {
            return Err(DomainError::InvalidAmount(format!(
                "Refund total {} would exceed paid amount {}",
                self.refunded_amount + amount,
                self.paid_amount
            )));
        }

        self.refunded_amount += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(captured: CaptureState) -> TransactionRecord {
        TransactionRecord::new("tid-123".to_string(), 42, dec!(1000), captured).unwrap()
    }

    #[test]
    fn test_new_record_starts_unrefunded() {
        let record = record(CaptureState::No);
        assert_eq!(record.refunded_amount, Decimal::ZERO);
        assert_eq!(record.state(), TransactionState::Authorized);
        assert!(!record.is_captured());
    }

    #[test]
    fn test_empty_tid_rejected() {
        let result = TransactionRecord::new(String::new(), 42, dec!(10), CaptureState::No);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result =
            TransactionRecord::new("tid-123".to_string(), 42, Decimal::ZERO, CaptureState::No);
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_transitions_once() {
        let mut record = record(CaptureState::No);
        record.mark_captured().unwrap();
        assert_eq!(record.state(), TransactionState::Captured);

        let second = record.mark_captured();
        assert!(second.is_err());
        assert!(record.is_captured());
    }

    #[test]
    fn test_refund_requires_capture() {
        let mut record = record(CaptureState::No);
        assert!(record.apply_refund(dec!(100)).is_err());
        assert_eq!(record.refunded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_refund_accumulates_to_cap() {
        let mut record = record(CaptureState::Yes);

        record.apply_refund(dec!(250)).unwrap();
        assert_eq!(record.refunded_amount, dec!(250));
        assert_eq!(record.state(), TransactionState::PartiallyRefunded);

        record.apply_refund(dec!(750)).unwrap();
        assert_eq!(record.refunded_amount, dec!(1000));
        assert_eq!(record.state(), TransactionState::FullyRefunded);
    }

    #[test]
    fn test_refund_beyond_cap_rejected() {
        let mut record = record(CaptureState::Yes);
        record.apply_refund(dec!(900)).unwrap();

        let result = record.apply_refund(dec!(200));
        assert!(result.is_err());
        assert_eq!(record.refunded_amount, dec!(900));
    }

    #[test]
    fn test_negative_refund_rejected() {
        let mut record = record(CaptureState::Yes);
        assert!(record.apply_refund(dec!(-1)).is_err());
    }
}
