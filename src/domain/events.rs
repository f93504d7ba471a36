use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Host-lifecycle event delivered to the dispatcher. The engine does not
/// depend on how these are sourced.
pub trait DomainEvent {
    fn event_type(&self) -> &'static str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// A merchant moved an order to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub order_id: i64,
    pub new_status_id: i32,
}

impl OrderStatusChanged {
    pub fn new(order_id: i64, new_status_id: i32) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            order_id,
            new_status_id,
        }
    }
}

impl DomainEvent for OrderStatusChanged {
    fn event_type(&self) -> &'static str {
        "OrderStatusChanged"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// A refund slip was created for an order; `amount` is the slip total
/// (line items plus shipping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundSlipCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub order_id: i64,
    pub amount: Decimal,
}

impl RefundSlipCreated {
    pub fn new(order_id: i64, amount: Decimal) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            order_id,
            amount,
        }
    }
}

impl DomainEvent for RefundSlipCreated {
    fn event_type(&self) -> &'static str {
        "RefundSlipCreated"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
