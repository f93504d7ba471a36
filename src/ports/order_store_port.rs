use crate::domain::errors::DomainResult;
use crate::domain::value_objects::Amount;
use async_trait::async_trait;

/// Store collaborator boundary: order validation, status transitions and
/// private order notes. Order management itself lives outside this engine.
#[async_trait]
pub trait OrderStorePort: Send + Sync {
    /// Validate and register the order for a paid cart, recording the
    /// gateway transaction id as payment reference. Returns the order id.
    async fn validate_order(
        &self,
        cart_id: i64,
        order_status_id: i32,
        amount: &Amount,
        payment_label: &str,
        transaction_id: &str,
    ) -> DomainResult<i64>;

    /// Move an order to the given status.
    async fn set_order_status(&self, order_id: i64, status_id: i32) -> DomainResult<()>;

    /// Append a private note to the order.
    async fn append_order_note(&self, order_id: i64, note: &str) -> DomainResult<()>;
}
