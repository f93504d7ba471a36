//! Mock port implementations shared by the application-layer test suites.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Amount, CaptureState};
use crate::domain::TransactionRecord;
use crate::ports::gateway_port::{
    CancelArgs, CaptureArgs, GatewayResponse, GatewayTransaction, PaymentIntentArgs, RefundArgs,
};
use crate::ports::{GatewayPort, LedgerPort, OrderStorePort};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockGateway {
    pub live: Mutex<Option<GatewayTransaction>>,
    pub capture_response: Mutex<Option<GatewayResponse>>,
    pub refund_response: Mutex<Option<GatewayResponse>>,
    pub cancel_response: Mutex<Option<GatewayResponse>>,
    pub capture_calls: Mutex<Vec<CaptureArgs>>,
    pub refund_calls: Mutex<Vec<RefundArgs>>,
    pub cancel_calls: Mutex<Vec<CancelArgs>>,
}

impl MockGateway {
    pub fn with_live(transaction: GatewayTransaction) -> Self {
        let gateway = Self::default();
        *gateway.live.lock().unwrap() = Some(transaction);
        gateway
    }
}

#[async_trait]
impl GatewayPort for MockGateway {
    async fn create_intent(&self, _args: PaymentIntentArgs) -> DomainResult<String> {
        Ok("intent-1".to_string())
    }

    async fn fetch(&self, transaction_id: &str) -> DomainResult<GatewayTransaction> {
        self.live.lock().unwrap().clone().ok_or_else(|| {
            DomainError::GatewayError(format!(
                "no transaction with provided id: {}",
                transaction_id
            ))
        })
    }

    async fn capture(
        &self,
        _transaction_id: &str,
        args: CaptureArgs,
    ) -> DomainResult<GatewayResponse> {
        self.capture_calls.lock().unwrap().push(args);
        Ok(self
            .capture_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }

    async fn refund(
        &self,
        _transaction_id: &str,
        args: RefundArgs,
    ) -> DomainResult<GatewayResponse> {
        self.refund_calls.lock().unwrap().push(args);
        Ok(self
            .refund_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }

    async fn cancel(
        &self,
        _transaction_id: &str,
        args: CancelArgs,
    ) -> DomainResult<GatewayResponse> {
        self.cancel_calls.lock().unwrap().push(args);
        Ok(self
            .cancel_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockLedger {
    pub rows: Mutex<HashMap<i64, TransactionRecord>>,
}

impl MockLedger {
    pub fn with_record(record: TransactionRecord) -> Self {
        let ledger = Self::default();
        ledger.rows.lock().unwrap().insert(record.order_id, record);
        ledger
    }

    pub fn row(&self, order_id: i64) -> TransactionRecord {
        self.rows.lock().unwrap().get(&order_id).unwrap().clone()
    }
}

#[async_trait]
impl LedgerPort for MockLedger {
    async fn insert(&self, record: &TransactionRecord) -> DomainResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(record.order_id, record.clone());
        Ok(())
    }

    async fn find_by_order(&self, order_id: i64) -> DomainResult<Option<TransactionRecord>> {
        Ok(self.rows.lock().unwrap().get(&order_id).cloned())
    }

    async fn mark_captured(&self, gateway_tid: &str, order_id: i64) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&order_id) {
            Some(row) if row.gateway_tid == gateway_tid && row.captured == CaptureState::No => {
                row.captured = CaptureState::Yes;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_refund(
        &self,
        gateway_tid: &str,
        order_id: i64,
        amount: Decimal,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&order_id) {
            Some(row) if row.gateway_tid == gateway_tid && row.captured == CaptureState::Yes => {
                row.refunded_amount += amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MockOrderStore {
    pub next_order_id: Mutex<i64>,
    pub fail_validation: Mutex<bool>,
    pub validations: Mutex<Vec<(i64, i32, String)>>,
    pub status_changes: Mutex<Vec<(i64, i32)>>,
    pub notes: Mutex<Vec<(i64, String)>>,
}

impl MockOrderStore {
    pub fn failing_validation() -> Self {
        let store = Self::default();
        *store.fail_validation.lock().unwrap() = true;
        store
    }
}

#[async_trait]
impl OrderStorePort for MockOrderStore {
    async fn validate_order(
        &self,
        cart_id: i64,
        order_status_id: i32,
        _amount: &Amount,
        _payment_label: &str,
        transaction_id: &str,
    ) -> DomainResult<i64> {
        if *self.fail_validation.lock().unwrap() {
            return Err(DomainError::OrderStoreError(format!(
                "cart {} failed validation",
                cart_id
            )));
        }

        self.validations
            .lock()
            .unwrap()
            .push((cart_id, order_status_id, transaction_id.to_string()));

        let mut next = self.next_order_id.lock().unwrap();
        *next += 1;
        Ok(1000 + *next)
    }

    async fn set_order_status(&self, order_id: i64, status_id: i32) -> DomainResult<()> {
        self.status_changes.lock().unwrap().push((order_id, status_id));
        Ok(())
    }

    async fn append_order_note(&self, order_id: i64, note: &str) -> DomainResult<()> {
        self.notes.lock().unwrap().push((order_id, note.to_string()));
        Ok(())
    }
}
