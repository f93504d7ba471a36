use crate::domain::errors::DomainResult;
use crate::domain::value_objects::Amount;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment-intent creation payload assembled at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentArgs {
    pub amount: Amount,
    pub customer: CustomerDetails,
    pub products: Vec<ProductLine>,
    pub platform_name: String,
    pub platform_version: String,
    pub integration_key: String,
    pub integration_name: String,
    pub redirect_url: String,
    pub preferred_payment_method: String,
    /// Wallet configuration id, required for the mobile-pay method
    pub wallet_configuration_id: Option<String>,
    /// Test-card fixture attached when the account runs in test mode
    pub test_fixture: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub telephone: String,
    pub address: String,
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
}

/// Live snapshot of a gateway transaction. This is the authority for how
/// much can still be captured, refunded or canceled; the local ledger row
/// is only an audit cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayTransaction {
    pub id: String,
    pub amount: Decimal,
    pub pending_amount: Decimal,
    pub captured_amount: Decimal,
    pub refunded_amount: Decimal,
    pub currency: String,
    pub created: DateTime<Utc>,
    pub authorisation_created: bool,
}

/// Structured result of a capture/refund/cancel call.
///
/// `error` with a message is a gateway-reported business failure; a
/// populated `transaction` confirms the mutation; neither present is an
/// ambiguous response that must not be treated as success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub error: bool,
    pub message: Option<String>,
    pub transaction: Option<GatewayTransaction>,
    pub capture_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureArgs {
    pub currency: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundArgs {
    pub descriptor: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelArgs {
    pub amount: Decimal,
}

/// Remote payment gateway operations. Any call may fail with a typed API
/// error (`DomainError::GatewayError` / `HttpError`), distinct from an
/// in-payload `error` flag.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Create a payment intent for a hosted checkout, returning its id.
    async fn create_intent(&self, args: PaymentIntentArgs) -> DomainResult<String>;

    /// Fetch the live transaction snapshot.
    async fn fetch(&self, transaction_id: &str) -> DomainResult<GatewayTransaction>;

    /// Capture an authorized amount.
    async fn capture(
        &self,
        transaction_id: &str,
        args: CaptureArgs,
    ) -> DomainResult<GatewayResponse>;

    /// Refund part or all of a captured amount.
    async fn refund(&self, transaction_id: &str, args: RefundArgs)
        -> DomainResult<GatewayResponse>;

    /// Release an authorization that was never captured.
    async fn cancel(&self, transaction_id: &str, args: CancelArgs)
        -> DomainResult<GatewayResponse>;
}
