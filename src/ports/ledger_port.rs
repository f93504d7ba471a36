use crate::domain::errors::DomainResult;
use crate::domain::TransactionRecord;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Transaction ledger contract: insert once per order, then conditional
/// updates keyed by `(gateway_tid, order_id)`.
///
/// The update methods are compare-and-set: they apply the change in a single
/// guarded statement and report whether a row matched, so two racing
/// triggers can never both win, and a refund total is never computed from a
/// stale row.
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Insert the row created by the return handler.
    async fn insert(&self, record: &TransactionRecord) -> DomainResult<()>;

    /// Load the ledger row for an order, if the order was paid through the
    /// gateway.
    async fn find_by_order(&self, order_id: i64) -> DomainResult<Option<TransactionRecord>>;

    /// Flip `captured` NO -> YES. Returns false when no uncaptured row
    /// matched the key.
    async fn mark_captured(&self, gateway_tid: &str, order_id: i64) -> DomainResult<bool>;

    /// Accumulate onto `refunded_amount` under the captured guard. Returns
    /// false when no captured row matched the key.
    async fn add_refund(
        &self,
        gateway_tid: &str,
        order_id: i64,
        amount: Decimal,
    ) -> DomainResult<bool>;
}
