use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{Amount, CaptureState, CheckoutMode};
use crate::domain::TransactionRecord;
use crate::ports::gateway_port::{CancelArgs, CaptureArgs, GatewayTransaction};
use crate::ports::{GatewayPort, LedgerPort, OrderStorePort};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What the shopper's checkout session looked like when they left for the
/// hosted page: the values the fetched transaction must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: Uuid,
    pub cart_id: i64,
    pub expected_amount: Amount,
    pub payment_method_label: String,
    pub checkout_mode: CheckoutMode,
    pub payment_intent_id: Option<String>,
}

/// Order-status ids the return handler registers orders with.
#[derive(Debug, Clone)]
pub struct ReturnHandlerSettings {
    /// Authorized, capture deferred to the status-change trigger
    pub paid_status_id: i32,
    /// Captured at checkout (instant mode)
    pub captured_status_id: i32,
}

/// Result of processing a shopper's return from hosted checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReturnOutcome {
    /// Payment confirmed and the order registered
    Completed {
        order_id: i64,
        transaction_id: String,
    },
    /// No payment intent on the session; only a fresh checkout can recover
    CartModified { message: String },
    /// Payment failed or could not be verified
    Failed { message: String },
}

/// Confirms a returning shopper's payment actually succeeded and was not
/// tampered with, then persists the authorization.
pub struct ReturnHandler<G: GatewayPort, L: LedgerPort, S: OrderStorePort> {
    gateway: Arc<G>,
    ledger: Arc<L>,
    orders: Arc<S>,
    settings: ReturnHandlerSettings,
}

impl<G: GatewayPort, L: LedgerPort, S: OrderStorePort> ReturnHandler<G, L, S> {
    pub fn new(
        gateway: Arc<G>,
        ledger: Arc<L>,
        orders: Arc<S>,
        settings: ReturnHandlerSettings,
    ) -> Self {
        Self {
            gateway,
            ledger,
            orders,
            settings,
        }
    }

    /// Interpret the gateway's answer for a returning shopper. Never
    /// returns an error: API exceptions are logged and folded into the
    /// error-page outcome.
    pub async fn process_return(&self, session: &CheckoutSession) -> ReturnOutcome {
        // 1. Resolve the intent id; without one the session is unrecoverable
        let Some(intent_id) = session.payment_intent_id.clone() else {
            warn!(
                "Checkout session {} has no payment intent",
                session.session_id
            );
            return ReturnOutcome::CartModified {
                message: "The current cart has been modified. Please make another payment."
                    .to_string(),
            };
        };

        match self.settle(session, &intent_id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    "Checkout return failed for cart {}: {}",
                    session.cart_id, err
                );
                ReturnOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    async fn settle(
        &self,
        session: &CheckoutSession,
        intent_id: &str,
    ) -> DomainResult<ReturnOutcome> {
        // 2. Fetch the live transaction
        let transaction = self.gateway.fetch(intent_id).await?;

        // 3. Tamper check: authorization flag, currency and decimal amount
        //    must all match the session
        if let Some(reason) = Self::validation_failure(&transaction, &session.expected_amount) {
            warn!(
                "Transaction {} failed validation for cart {}: {} (amount {} {}, expected {})",
                intent_id,
                session.cart_id,
                reason,
                transaction.amount,
                transaction.currency,
                session.expected_amount
            );
            return Ok(ReturnOutcome::Failed {
                message: reason.to_string(),
            });
        }

        // 4. Instant mode captures now; only a completed capture counts
        let mut captured = CaptureState::No;
        if session.checkout_mode == CheckoutMode::Instant {
            let response = self
                .gateway
                .capture(
                    intent_id,
                    CaptureArgs {
                        currency: transaction.currency.clone(),
                        amount: transaction.pending_amount,
                    },
                )
                .await?;

            if response.capture_state.as_deref() == Some("completed") {
                captured = CaptureState::Yes;
            } else {
                let message = response
                    .message
                    .unwrap_or_else(|| "The payment could not be captured.".to_string());
                warn!(
                    "Capture on return was not completed for {}: {}",
                    intent_id, message
                );
                return Ok(ReturnOutcome::Failed { message });
            }
        }

        // 5. Register the order; an invalid order must not keep the charge,
        //    so a failure releases the authorization back
        let status_id = match captured {
            CaptureState::Yes => self.settings.captured_status_id,
            CaptureState::No => self.settings.paid_status_id,
        };

        let order_id = match self
            .orders
            .validate_order(
                session.cart_id,
                status_id,
                &session.expected_amount,
                &session.payment_method_label,
                intent_id,
            )
            .await
        {
            Ok(order_id) => order_id,
            Err(err) => {
                error!(
                    "Order validation failed for cart {}: {}",
                    session.cart_id, err
                );
                if let Err(cancel_err) = self
                    .gateway
                    .cancel(
                        intent_id,
                        CancelArgs {
                            amount: transaction.amount,
                        },
                    )
                    .await
                {
                    error!("Compensating cancel failed for {}: {}", intent_id, cancel_err);
                }
                return Ok(ReturnOutcome::Failed {
                    message: "Error validating the order. Please contact the system administrator."
                        .to_string(),
                });
            }
        };

        // 6. Record the authorization in the ledger
        let record = TransactionRecord::new(
            intent_id.to_string(),
            order_id,
            transaction.amount,
            captured,
        )?;
        self.ledger.insert(&record).await?;

        let note = Self::return_note(&transaction, captured);
        self.orders.append_order_note(order_id, &note).await?;

        info!(
            "Checkout return recorded for order {} (transaction {}, captured {})",
            order_id, intent_id, captured
        );

        Ok(ReturnOutcome::Completed {
            order_id,
            transaction_id: intent_id.to_string(),
        })
    }

    fn validation_failure(
        transaction: &GatewayTransaction,
        expected: &Amount,
    ) -> Option<&'static str> {
        if !transaction.authorisation_created {
            return Some("The payment was not authorized.");
        }

        if transaction.currency != expected.currency {
            return Some("The payment currency does not match the order.");
        }

        if transaction.amount != expected.value {
            return Some("The paid amount does not match the order total.");
        }

        None
    }

    fn return_note(transaction: &GatewayTransaction, captured: CaptureState) -> String {
        let captured_amount = match captured {
            CaptureState::Yes => transaction.amount,
            CaptureState::No => Decimal::ZERO,
        };

        format!(
            "Trx ID: {}\nAuthorized Amount: {}\nCaptured Amount: {}\nOrder time: {}\nCurrency code: {}",
            transaction.id, transaction.amount, captured_amount, transaction.created, transaction.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MockGateway, MockLedger, MockOrderStore};
    use crate::ports::gateway_port::GatewayResponse;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn settings() -> ReturnHandlerSettings {
        ReturnHandlerSettings {
            paid_status_id: 2,
            captured_status_id: 5,
        }
    }

    fn session(mode: CheckoutMode) -> CheckoutSession {
        CheckoutSession {
            session_id: Uuid::new_v4(),
            cart_id: 7,
            expected_amount: Amount::new("EUR", dec!(1000)),
            payment_method_label: "Cards".to_string(),
            checkout_mode: mode,
            payment_intent_id: Some("tid-1".to_string()),
        }
    }

    fn authorized_transaction() -> GatewayTransaction {
        GatewayTransaction {
            id: "tid-1".to_string(),
            amount: dec!(1000),
            pending_amount: dec!(1000),
            captured_amount: Decimal::ZERO,
            refunded_amount: Decimal::ZERO,
            currency: "EUR".to_string(),
            created: Utc::now(),
            authorisation_created: true,
        }
    }

    fn build(
        gateway: MockGateway,
        orders: MockOrderStore,
    ) -> (
        ReturnHandler<MockGateway, MockLedger, MockOrderStore>,
        Arc<MockGateway>,
        Arc<MockLedger>,
        Arc<MockOrderStore>,
    ) {
        let gateway = Arc::new(gateway);
        let ledger = Arc::new(MockLedger::default());
        let orders = Arc::new(orders);
        let handler =
            ReturnHandler::new(gateway.clone(), ledger.clone(), orders.clone(), settings());
        (handler, gateway, ledger, orders)
    }

    #[tokio::test]
    async fn test_delayed_mode_records_uncaptured_row() {
        let gateway = MockGateway::with_live(authorized_transaction());
        let (handler, gateway, ledger, orders) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        let ReturnOutcome::Completed {
            order_id,
            transaction_id,
        } = outcome
        else {
            panic!("expected completed outcome, got {:?}", outcome);
        };
        assert_eq!(transaction_id, "tid-1");

        // no capture in delayed mode
        assert!(gateway.capture_calls.lock().unwrap().is_empty());

        let row = ledger.row(order_id);
        assert_eq!(row.captured, CaptureState::No);
        assert_eq!(row.paid_amount, dec!(1000));
        assert_eq!(row.refunded_amount, Decimal::ZERO);

        // order registered with the awaiting-capture status
        assert_eq!(orders.validations.lock().unwrap()[0].1, 2);
        assert!(orders.notes.lock().unwrap()[0].1.contains("Captured Amount: 0"));
    }

    #[tokio::test]
    async fn test_instant_mode_captures_pending_amount() {
        let gateway = MockGateway::with_live(authorized_transaction());
        *gateway.capture_response.lock().unwrap() = Some(GatewayResponse {
            error: false,
            message: None,
            transaction: Some(authorized_transaction()),
            capture_state: Some("completed".to_string()),
        });
        let (handler, gateway, ledger, orders) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Instant)).await;

        let ReturnOutcome::Completed { order_id, .. } = outcome else {
            panic!("expected completed outcome, got {:?}", outcome);
        };

        let calls = gateway.capture_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount, dec!(1000));
        assert_eq!(calls[0].currency, "EUR");

        assert_eq!(ledger.row(order_id).captured, CaptureState::Yes);
        assert_eq!(orders.validations.lock().unwrap()[0].1, 5);
    }

    #[tokio::test]
    async fn test_instant_mode_incomplete_capture_fails() {
        let gateway = MockGateway::with_live(authorized_transaction());
        *gateway.capture_response.lock().unwrap() = Some(GatewayResponse {
            error: false,
            message: Some("capture declined".to_string()),
            transaction: None,
            capture_state: Some("declined".to_string()),
        });
        let (handler, _, ledger, orders) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Instant)).await;

        assert_eq!(
            outcome,
            ReturnOutcome::Failed {
                message: "capture declined".to_string()
            }
        );
        assert!(ledger.rows.lock().unwrap().is_empty());
        assert!(orders.validations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_intent_requires_new_payment() {
        let gateway = MockGateway::with_live(authorized_transaction());
        let (handler, gateway, ledger, _) = build(gateway, MockOrderStore::default());

        let mut session = session(CheckoutMode::Delayed);
        session.payment_intent_id = None;

        let outcome = handler.process_return(&session).await;

        assert!(matches!(outcome, ReturnOutcome::CartModified { .. }));
        assert!(gateway.capture_calls.lock().unwrap().is_empty());
        assert!(ledger.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_currency_mismatch_never_creates_record() {
        let mut transaction = authorized_transaction();
        transaction.currency = "DKK".to_string();
        let gateway = MockGateway::with_live(transaction);
        let (handler, _, ledger, orders) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        let ReturnOutcome::Failed { message } = outcome else {
            panic!("expected failed outcome, got {:?}", outcome);
        };
        assert!(message.contains("currency"));
        assert!(ledger.rows.lock().unwrap().is_empty());
        assert!(orders.validations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amount_mismatch_never_creates_record() {
        let mut transaction = authorized_transaction();
        transaction.amount = dec!(999);
        let gateway = MockGateway::with_live(transaction);
        let (handler, _, ledger, _) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        let ReturnOutcome::Failed { message } = outcome else {
            panic!("expected failed outcome, got {:?}", outcome);
        };
        assert!(message.contains("amount"));
        assert!(ledger.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_transaction_fails() {
        let mut transaction = authorized_transaction();
        transaction.authorisation_created = false;
        let gateway = MockGateway::with_live(transaction);
        let (handler, _, ledger, _) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        assert!(matches!(outcome, ReturnOutcome::Failed { .. }));
        assert!(ledger.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_order_triggers_compensating_cancel() {
        let gateway = MockGateway::with_live(authorized_transaction());
        let (handler, gateway, ledger, _) = build(gateway, MockOrderStore::failing_validation());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        assert!(matches!(outcome, ReturnOutcome::Failed { .. }));

        let cancels = gateway.cancel_calls.lock().unwrap();
        assert_eq!(cancels.len(), 1);
        assert_eq!(cancels[0].amount, dec!(1000));
        assert!(ledger.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_routes_to_error_page() {
        let gateway = MockGateway::default();
        let (handler, _, ledger, _) = build(gateway, MockOrderStore::default());

        let outcome = handler.process_return(&session(CheckoutMode::Delayed)).await;

        assert!(matches!(outcome, ReturnOutcome::Failed { .. }));
        assert!(ledger.rows.lock().unwrap().is_empty());
    }
}
