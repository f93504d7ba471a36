use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{DomainEvent, OrderStatusChanged, RefundSlipCreated};
use crate::domain::value_objects::{ActionOutcome, PaymentAction};
use crate::domain::TransactionRecord;
use crate::ports::gateway_port::{CancelArgs, CaptureArgs, GatewayResponse, GatewayTransaction, RefundArgs};
use crate::ports::{GatewayPort, LedgerPort, OrderStorePort};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

/// Order-status ids the dispatcher advances orders to, resolved once at
/// construction.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Status configured to mean "captured" (also the delayed-capture trigger)
    pub captured_status_id: i32,
    pub canceled_status_id: i32,
    pub refunded_status_id: i32,
}

/// Per-order serialization points. Two racing actions on the same order go
/// through the precondition checks one at a time, so only one of them
/// reaches the gateway.
pub struct OrderLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire(&self, order_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(order_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}

impl Default for OrderLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// The reconciliation engine's primary entry point: applies the transaction
/// state machine to a requested action, calls the gateway and keeps the
/// ledger row consistent with the result.
pub struct PaymentActionDispatcher<G: GatewayPort, L: LedgerPort, S: OrderStorePort> {
    gateway: Arc<G>,
    ledger: Arc<L>,
    orders: Arc<S>,
    settings: DispatcherSettings,
    locks: OrderLocks,
}

impl<G: GatewayPort, L: LedgerPort, S: OrderStorePort> PaymentActionDispatcher<G, L, S> {
    pub fn new(gateway: Arc<G>, ledger: Arc<L>, orders: Arc<S>, settings: DispatcherSettings) -> Self {
        Self {
            gateway,
            ledger,
            orders,
            settings,
            locks: OrderLocks::new(),
        }
    }

    /// Process a capture/refund/cancel request for an order.
    ///
    /// Always returns an outcome, never an error: precondition violations
    /// come back as warnings without a gateway call, gateway-reported and
    /// transport failures as errors. Every non-success outcome is logged
    /// here before being returned.
    pub async fn process_order_payment(
        &self,
        order_id: i64,
        action: PaymentAction,
        change_status: bool,
        refund_amount: Option<Decimal>,
    ) -> ActionOutcome {
        let _guard = self.locks.acquire(order_id).await;

        let outcome = self
            .dispatch(order_id, action, change_status, refund_amount)
            .await
            .unwrap_or_else(|err| ActionOutcome::error(err.to_string()));

        match &outcome {
            ActionOutcome::Success { message } => {
                info!("Payment {} for order {}: {}", action, order_id, message);
            }
            ActionOutcome::Warning { message } => {
                warn!("Payment {} for order {}: {}", action, order_id, message);
            }
            ActionOutcome::Error { message } => {
                error!("Payment {} for order {}: {}", action, order_id, message);
            }
        }

        outcome
    }

    /// Order-status hook: the configured captured status maps to capture,
    /// the canceled status maps to cancel, anything else is ignored. Orders
    /// without a ledger row are skipped. Status advancement is suppressed,
    /// the order just moved.
    pub async fn handle_status_change(&self, event: &OrderStatusChanged) -> Option<ActionOutcome> {
        let action = if event.new_status_id == self.settings.captured_status_id {
            PaymentAction::Capture
        } else if event.new_status_id == self.settings.canceled_status_id {
            PaymentAction::Cancel
        } else {
            return None;
        };

        if !self.has_ledger_row(event.order_id).await {
            return None;
        }

        debug!(
            "{} for order {} maps to {}",
            event.event_type(),
            event.order_id,
            action
        );

        Some(
            self.process_order_payment(event.order_id, action, false, None)
                .await,
        )
    }

    /// Refund-slip hook: refund the slip total. The slip workflow owns the
    /// order-status transition, so none happens here.
    pub async fn handle_refund_slip(&self, event: &RefundSlipCreated) -> Option<ActionOutcome> {
        if !self.has_ledger_row(event.order_id).await {
            return None;
        }

        debug!(
            "{} for order {}: refunding {}",
            event.event_type(),
            event.order_id,
            event.amount
        );

        Some(
            self.process_order_payment(
                event.order_id,
                PaymentAction::Refund,
                false,
                Some(event.amount),
            )
            .await,
        )
    }

    async fn dispatch(
        &self,
        order_id: i64,
        action: PaymentAction,
        change_status: bool,
        refund_amount: Option<Decimal>,
    ) -> DomainResult<ActionOutcome> {
        // 1. Load the ledger row
        let Some(record) = self.ledger.find_by_order(order_id).await? else {
            return Err(DomainError::TransactionNotFound(format!(
                "order {}",
                order_id
            )));
        };

        // 2. Preconditions decidable without a gateway round-trip
        match action {
            PaymentAction::Capture if record.is_captured() => {
                return Ok(ActionOutcome::warning("Transaction already Captured."));
            }
            PaymentAction::Refund if !record.is_captured() => {
                return Ok(ActionOutcome::warning(
                    "You need to Capture the Transaction prior to Refund.",
                ));
            }
            PaymentAction::Cancel if record.is_captured() => {
                return Ok(ActionOutcome::warning(
                    "Transaction already Captured, try to Refund instead.",
                ));
            }
            _ => {}
        }

        // 3. Re-fetch the live transaction; the gateway stays the amount
        //    authority, the local row is never trusted for amounts
        let live = self.gateway.fetch(&record.gateway_tid).await?;

        // 4. Run the action flow
        match action {
            PaymentAction::Capture => self.capture_flow(&record, &live, change_status).await,
            PaymentAction::Refund => self.refund_flow(&record, refund_amount, change_status).await,
            PaymentAction::Cancel => self.cancel_flow(&record, &live, change_status).await,
        }
    }

    async fn capture_flow(
        &self,
        record: &TransactionRecord,
        live: &GatewayTransaction,
        change_status: bool,
    ) -> DomainResult<ActionOutcome> {
        if live.pending_amount <= Decimal::ZERO {
            return Ok(ActionOutcome::error("Invalid amount to Capture."));
        }

        let response = self
            .gateway
            .capture(
                &record.gateway_tid,
                CaptureArgs {
                    currency: live.currency.clone(),
                    amount: live.pending_amount,
                },
            )
            .await?;

        let confirmed = match Self::confirmed_transaction(response) {
            Ok(transaction) => transaction,
            Err(outcome) => return Ok(outcome),
        };

        let updated = self
            .ledger
            .mark_captured(&record.gateway_tid, record.order_id)
            .await?;
        if !updated {
            return Ok(ActionOutcome::warning("Transaction already Captured."));
        }

        if change_status {
            self.orders
                .set_order_status(record.order_id, self.settings.captured_status_id)
                .await?;
        }

        let note = Self::transaction_note(&confirmed, PaymentAction::Capture);
        self.orders.append_order_note(record.order_id, &note).await?;

        Ok(ActionOutcome::success("Transaction successfully Captured."))
    }

    async fn refund_flow(
        &self,
        record: &TransactionRecord,
        refund_amount: Option<Decimal>,
        change_status: bool,
    ) -> DomainResult<ActionOutcome> {
        let amount = refund_amount.unwrap_or(Decimal::ZERO);
        if amount <= Decimal::ZERO {
            return Ok(ActionOutcome::error("Invalid amount to Refund."));
        }

        // Reject totals the ledger invariant would not admit before asking
        // the gateway
        let mut probe = record.clone();
        if probe.apply_refund(amount).is_err() {
            return Ok(ActionOutcome::error("Invalid amount to Refund."));
        }

        let response = self
            .gateway
            .refund(
                &record.gateway_tid,
                RefundArgs {
                    descriptor: String::new(),
                    amount,
                },
            )
            .await?;

        let confirmed = match Self::confirmed_transaction(response) {
            Ok(transaction) => transaction,
            Err(outcome) => return Ok(outcome),
        };

        let updated = self
            .ledger
            .add_refund(&record.gateway_tid, record.order_id, amount)
            .await?;
        if !updated {
            return Ok(ActionOutcome::error(format!(
                "Failed to record the refund for order {}",
                record.order_id
            )));
        }

        if change_status {
            self.orders
                .set_order_status(record.order_id, self.settings.refunded_status_id)
                .await?;
        }

        let note = Self::transaction_note(&confirmed, PaymentAction::Refund);
        self.orders.append_order_note(record.order_id, &note).await?;

        Ok(ActionOutcome::success("Transaction successfully Refunded."))
    }

    async fn cancel_flow(
        &self,
        record: &TransactionRecord,
        live: &GatewayTransaction,
        change_status: bool,
    ) -> DomainResult<ActionOutcome> {
        let response = self
            .gateway
            .cancel(
                &record.gateway_tid,
                CancelArgs {
                    amount: live.amount - live.refunded_amount,
                },
            )
            .await?;

        let confirmed = match Self::confirmed_transaction(response) {
            Ok(transaction) => transaction,
            Err(outcome) => return Ok(outcome),
        };

        if change_status {
            self.orders
                .set_order_status(record.order_id, self.settings.canceled_status_id)
                .await?;
        }

        let note = Self::transaction_note(&confirmed, PaymentAction::Cancel);
        self.orders.append_order_note(record.order_id, &note).await?;

        Ok(ActionOutcome::success("Transaction successfully Canceled."))
    }

    /// Shared response shaping: in-payload error beats everything, a
    /// confirmed transaction means success, anything else is ambiguous and
    /// never assumed successful.
    fn confirmed_transaction(response: GatewayResponse) -> Result<GatewayTransaction, ActionOutcome> {
        if response.error {
            let message = response
                .message
                .unwrap_or_else(|| "Gateway reported an error.".to_string());
            return Err(ActionOutcome::error(message));
        }

        match response.transaction {
            Some(transaction) => Ok(transaction),
            None => match response.message {
                Some(message) => Err(ActionOutcome::warning(message)),
                None => Err(ActionOutcome::error("Unexpected gateway response.")),
            },
        }
    }

    fn transaction_note(transaction: &GatewayTransaction, action: PaymentAction) -> String {
        let detail = match action {
            PaymentAction::Capture => format!("Captured Amount: {}", transaction.captured_amount),
            PaymentAction::Refund | PaymentAction::Cancel => {
                format!("Refunded Amount: {}", transaction.refunded_amount)
            }
        };

        format!(
            "Trx ID: {}\nAuthorized Amount: {}\n{}\nOrder time: {}\nCurrency code: {}",
            transaction.id, transaction.amount, detail, transaction.created, transaction.currency
        )
    }

    async fn has_ledger_row(&self, order_id: i64) -> bool {
        matches!(self.ledger.find_by_order(order_id).await, Ok(Some(_)))
    }
}
