use super::handlers::*;
use crate::ports::{GatewayPort, LedgerPort, OrderStorePort};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router<G, L, S>(state: AppState<G, L, S>) -> Router
where
    G: GatewayPort + 'static,
    L: LedgerPort + 'static,
    S: OrderStorePort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/checkout", post(begin_checkout))
        .route("/api/checkout/return", get(payment_return))
        .route("/api/orders/:order_id/payment", post(order_payment_action))
        .route("/api/hooks/order-status", post(order_status_hook))
        .route("/api/hooks/refund-slip", post(refund_slip_hook))
        .route("/api/backoffice/messages", get(backoffice_messages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
