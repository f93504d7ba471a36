use crate::application::{
    CheckoutRequest, CheckoutResponse, CheckoutSession, ErrorResponse, OrderStatusHookRequest,
    PaymentActionDispatcher, PaymentActionRequest, RefundSlipHookRequest, ReturnHandler,
    ReturnOutcome,
};
use crate::domain::events::{OrderStatusChanged, RefundSlipCreated};
use crate::domain::value_objects::Amount;
use crate::infrastructure::config::{AppConfig, TransactionMode};
use crate::infrastructure::{CheckoutSessionStore, FlashStore};
use crate::ports::gateway_port::PaymentIntentArgs;
use crate::ports::{GatewayPort, LedgerPort, OrderStorePort};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Scope trigger-driven messages park in until the back office drains them.
const BACKOFFICE_SCOPE: &str = "backoffice";

/// Shared application state.
pub struct AppState<G: GatewayPort, L: LedgerPort, S: OrderStorePort> {
    pub dispatcher: Arc<PaymentActionDispatcher<G, L, S>>,
    pub return_handler: Arc<ReturnHandler<G, L, S>>,
    pub gateway: Arc<G>,
    pub sessions: Arc<CheckoutSessionStore>,
    pub flash: Arc<FlashStore>,
    pub config: Arc<AppConfig>,
}

impl<G: GatewayPort, L: LedgerPort, S: OrderStorePort> Clone for AppState<G, L, S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            return_handler: self.return_handler.clone(),
            gateway: self.gateway.clone(),
            sessions: self.sessions.clone(),
            flash: self.flash.clone(),
            config: self.config.clone(),
        }
    }
}

/// Begin a hosted checkout: create the payment intent and answer with the
/// redirect URL for the shopper.
pub async fn begin_checkout<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    info!("Checkout requested for cart {}", request.cart_id);

    let method_config = state
        .config
        .method_config(request.payment_method)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "CHECKOUT_ERROR".to_string(),
                    format!(
                        "Payment method {} is not available",
                        request.payment_method
                    ),
                )),
            )
        })?;

    let session_id = Uuid::new_v4();
    let amount = Amount::new(request.currency.clone(), request.amount);

    let args = PaymentIntentArgs {
        amount: amount.clone(),
        customer: request.customer,
        products: request.products,
        platform_name: state.config.platform_name.clone(),
        platform_version: state.config.platform_version.clone(),
        integration_key: state.config.public_key().to_string(),
        integration_name: state.config.shop_name.clone(),
        redirect_url: format!("{}?session_id={}", state.config.return_url, session_id),
        preferred_payment_method: request.payment_method.to_string(),
        wallet_configuration_id: method_config.configuration_id().map(String::from),
        test_fixture: match state.config.mode {
            TransactionMode::Test => Some(test_card_fixture(&request.currency)),
            TransactionMode::Live => None,
        },
    };

    let intent_id = state.gateway.create_intent(args).await.map_err(|e| {
        error!(
            "Payment intent creation failed for cart {}: {}",
            request.cart_id, e
        );
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new("GATEWAY_ERROR".to_string(), e.to_string())),
        )
    })?;

    state
        .sessions
        .put(CheckoutSession {
            session_id,
            cart_id: request.cart_id,
            expected_amount: amount,
            payment_method_label: format!(
                "{} ({})",
                method_config.settings().title,
                method_config.method()
            ),
            checkout_mode: method_config.settings().checkout_mode,
            payment_intent_id: Some(intent_id.clone()),
        })
        .await;

    let redirect_url = format!("{}?id={}", state.config.hosted_checkout_url(), intent_id);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            session_id,
            redirect_url,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    pub session_id: Uuid,
}

/// Shopper return from the hosted checkout page.
pub async fn payment_return<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
    Query(query): Query<ReturnQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    info!("Shopper returned for checkout session {}", query.session_id);

    let Some(session) = state.sessions.get(query.session_id).await else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "SESSION_ERROR".to_string(),
                "Checkout session not found".to_string(),
            )),
        ));
    };

    let outcome = state.return_handler.process_return(&session).await;

    let status = match &outcome {
        ReturnOutcome::Completed { .. } => {
            state.sessions.remove(query.session_id).await;
            StatusCode::OK
        }
        ReturnOutcome::CartModified { .. } | ReturnOutcome::Failed { .. } => {
            StatusCode::PAYMENT_REQUIRED
        }
    };

    Ok((status, Json(outcome)))
}

/// Merchant-initiated capture/refund/cancel from the back office; these
/// advance the order status on success.
pub async fn order_payment_action<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
    Path(order_id): Path<i64>,
    Json(request): Json<PaymentActionRequest>,
) -> impl IntoResponse {
    let outcome = state
        .dispatcher
        .process_order_payment(order_id, request.action, true, request.amount)
        .await;

    state.flash.push_outcome(BACKOFFICE_SCOPE, &outcome).await;

    Json(outcome)
}

/// Order-status lifecycle trigger.
pub async fn order_status_hook<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
    Json(request): Json<OrderStatusHookRequest>,
) -> impl IntoResponse {
    let event = OrderStatusChanged::new(request.order_id, request.new_status_id);
    let outcome = state.dispatcher.handle_status_change(&event).await;

    if let Some(outcome) = &outcome {
        state.flash.push_outcome(BACKOFFICE_SCOPE, outcome).await;
    }

    Json(serde_json::json!({
        "handled": outcome.is_some(),
        "outcome": outcome,
    }))
}

/// Refund-slip lifecycle trigger.
pub async fn refund_slip_hook<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
    Json(request): Json<RefundSlipHookRequest>,
) -> impl IntoResponse {
    let event = RefundSlipCreated::new(request.order_id, request.total());
    let outcome = state.dispatcher.handle_refund_slip(&event).await;

    if let Some(outcome) = &outcome {
        state.flash.push_outcome(BACKOFFICE_SCOPE, outcome).await;
    }

    Json(serde_json::json!({
        "handled": outcome.is_some(),
        "outcome": outcome,
    }))
}

/// Read-once messages for the next back-office render.
pub async fn backoffice_messages<G: GatewayPort, L: LedgerPort, S: OrderStorePort>(
    State(state): State<AppState<G, L, S>>,
) -> impl IntoResponse {
    Json(state.flash.drain(BACKOFFICE_SCOPE).await)
}

/// Health check.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

fn test_card_fixture(currency: &str) -> serde_json::Value {
    serde_json::json!({
        "card": {
            "scheme": "supported",
            "code": "valid",
            "status": "valid",
            "limit": { "decimal": "25000.99", "currency": currency },
            "balance": { "decimal": "25000.99", "currency": currency }
        },
        "fingerprint": "success",
        "tds": {
            "fingerprint": "success",
            "challenge": true,
            "status": "authenticated"
        }
    })
}
