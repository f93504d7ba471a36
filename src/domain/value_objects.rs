use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger capture flag, persisted verbatim in the `captured` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    /// Authorized, not yet captured
    No,
    /// Captured at least once
    Yes,
}

impl CaptureState {
    pub fn from_column(value: &str) -> Option<Self> {
        match value {
            "NO" => Some(CaptureState::No),
            "YES" => Some(CaptureState::Yes),
            _ => None,
        }
    }

    pub fn as_column(&self) -> &'static str {
        match self {
            CaptureState::No => "NO",
            CaptureState::Yes => "YES",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_column())
    }
}

/// Lifecycle state derived from a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Authorized, capturable or cancelable
    Authorized,
    /// Captured, nothing refunded yet
    Captured,
    /// Captured with a partial refund applied
    PartiallyRefunded,
    /// Captured and refunded in full
    FullyRefunded,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Authorized => write!(f, "authorized"),
            TransactionState::Captured => write!(f, "captured"),
            TransactionState::PartiallyRefunded => write!(f, "partially_refunded"),
            TransactionState::FullyRefunded => write!(f, "fully_refunded"),
        }
    }
}

/// Gateway operation requested against an order's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAction {
    Capture,
    Refund,
    Cancel,
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentAction::Capture => write!(f, "capture"),
            PaymentAction::Refund => write!(f, "refund"),
            PaymentAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Payment method offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cards,
    MobilePay,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cards => write!(f, "Cards"),
            PaymentMethod::MobilePay => write!(f, "MobilePay"),
        }
    }
}

/// Merchant capture mode: capture at checkout return or later via an
/// order-status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Instant,
    Delayed,
}

/// A monetary value with its ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub value: Decimal,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Tri-state result of a payment action. Callers branch on the variant
/// only, never on gateway internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Success { message: String },
    Warning { message: String },
    Error { message: String },
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        ActionOutcome::Success {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ActionOutcome::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ActionOutcome::Error {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Success { message }
            | ActionOutcome::Warning { message }
            | ActionOutcome::Error { message } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ActionOutcome::Warning { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ActionOutcome::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_state_column_round_trip() {
        assert_eq!(CaptureState::from_column("NO"), Some(CaptureState::No));
        assert_eq!(CaptureState::from_column("YES"), Some(CaptureState::Yes));
        assert_eq!(CaptureState::from_column("MAYBE"), None);
        assert_eq!(CaptureState::Yes.as_column(), "YES");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ActionOutcome::warning("Transaction already Captured.");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"], "Transaction already Captured.");
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(ActionOutcome::success("ok").is_success());
        assert!(ActionOutcome::error("bad").is_error());
        assert_eq!(ActionOutcome::warning("w").message(), "w");
    }
}
