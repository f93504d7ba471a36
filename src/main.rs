mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;

use api::AppState;
use application::{
    DispatcherSettings, PaymentActionDispatcher, ReturnHandler, ReturnHandlerSettings,
};
use infrastructure::{
    AppConfig, CheckoutSessionStore, FlashStore, HttpGatewayClient, MySqlLedger, MySqlOrderStore,
};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Environment
    dotenvy::dotenv().ok();

    info!("Starting payment reconciliation service...");

    // Database pool
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    info!("Connecting to database...");

    let pool = Arc::new(MySqlPool::connect(&database_url).await?);
    info!("Database connected successfully");

    // Settings, resolved once
    let config = AppConfig::from_env();
    info!("Gateway configuration loaded ({:?} mode)", config.mode);

    // Adapters
    let gateway = Arc::new(HttpGatewayClient::new(
        config.endpoints.api_base_url.clone(),
        config.secret_key().to_string(),
    ));

    let ledger = Arc::new(MySqlLedger::new(pool.clone()));
    ledger.ensure_schema().await?;

    let orders = Arc::new(MySqlOrderStore::new(pool));

    // Reconciliation engine
    let dispatcher = Arc::new(PaymentActionDispatcher::new(
        gateway.clone(),
        ledger.clone(),
        orders.clone(),
        DispatcherSettings {
            captured_status_id: config.statuses.captured,
            canceled_status_id: config.statuses.canceled,
            refunded_status_id: config.statuses.refunded,
        },
    ));

    let return_handler = Arc::new(ReturnHandler::new(
        gateway.clone(),
        ledger,
        orders,
        ReturnHandlerSettings {
            paid_status_id: config.statuses.paid,
            captured_status_id: config.statuses.captured,
        },
    ));

    // Application state
    let app_state = AppState {
        dispatcher,
        return_handler,
        gateway,
        sessions: Arc::new(CheckoutSessionStore::new()),
        flash: Arc::new(FlashStore::new()),
        config: config.clone(),
    };

    // Router
    let app = api::create_router(app_state);

    // Server
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /api/checkout - Begin hosted checkout");
    info!("  GET  /api/checkout/return - Shopper return from hosted checkout");
    info!("  POST /api/orders/:order_id/payment - Capture/refund/cancel an order payment");
    info!("  POST /api/hooks/order-status - Order-status change trigger");
    info!("  POST /api/hooks/refund-slip - Refund-slip trigger");
    info!("  GET  /api/backoffice/messages - Drain pending back-office messages");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
