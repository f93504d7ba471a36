use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::CaptureState;
use crate::domain::TransactionRecord;
use crate::ports::ledger_port::LedgerPort;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;

/// MySQL transaction ledger.
///
/// Updates are single guarded statements keyed by `(gateway_tid, order_id)`
/// so two racing triggers can never both win the same transition, and the
/// refund total is accumulated in SQL rather than computed from a
/// previously read row.
#[derive(Clone)]
pub struct MySqlLedger {
    pool: Arc<Pool<MySql>>,
}

impl MySqlLedger {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    /// Create the ledger table when missing.
    pub async fn ensure_schema(&self) -> DomainResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS payment_transactions (
                id              INT NOT NULL AUTO_INCREMENT,
                gateway_tid     VARCHAR(255) NOT NULL,
                order_id        BIGINT NOT NULL,
                payed_at        DATETIME NOT NULL,
                payed_amount    DECIMAL(20,6) NOT NULL,
                refunded_amount DECIMAL(20,6) NOT NULL,
                captured        VARCHAR(255) NOT NULL,
                PRIMARY KEY (id),
                UNIQUE KEY uniq_tid_order (gateway_tid, order_id)
            ) ENGINE=InnoDB
        "#;

        sqlx::query(ddl).execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerPort for MySqlLedger {
    async fn insert(&self, record: &TransactionRecord) -> DomainResult<()> {
        let query = r#"
            INSERT INTO payment_transactions (
                gateway_tid, order_id, payed_at, payed_amount, refunded_amount, captured
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&record.gateway_tid)
            .bind(record.order_id)
            .bind(record.paid_at)
            .bind(record.paid_amount)
            .bind(record.refunded_amount)
            .bind(record.captured.as_column())
            .execute(self.pool.as_ref())
            .await?;

        debug!(
            "Ledger row inserted for order {} ({})",
            record.order_id, record.gateway_tid
        );
        Ok(())
    }

    async fn find_by_order(&self, order_id: i64) -> DomainResult<Option<TransactionRecord>> {
        let query = r#"
            SELECT gateway_tid, order_id, payed_at, payed_amount, refunded_amount, captured
            FROM payment_transactions
            WHERE order_id = ?
        "#;

        let row = sqlx::query_as::<_, TransactionRow>(query)
            .bind(order_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(TransactionRow::into_record).transpose()
    }

    async fn mark_captured(&self, gateway_tid: &str, order_id: i64) -> DomainResult<bool> {
        let query = r#"
            UPDATE payment_transactions
            SET captured = 'YES'
            WHERE gateway_tid = ? AND order_id = ? AND captured = 'NO'
        "#;

        let rows_affected = sqlx::query(query)
            .bind(gateway_tid)
            .bind(order_id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        debug!(
            "Ledger capture update for order {}: {} row(s)",
            order_id, rows_affected
        );
        Ok(rows_affected > 0)
    }

    async fn add_refund(
        &self,
        gateway_tid: &str,
        order_id: i64,
        amount: Decimal,
    ) -> DomainResult<bool> {
        let query = r#"
            UPDATE payment_transactions
            SET refunded_amount = refunded_amount + ?
            WHERE gateway_tid = ? AND order_id = ? AND captured = 'YES'
        "#;

        let rows_affected = sqlx::query(query)
            .bind(amount)
            .bind(gateway_tid)
            .bind(order_id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        debug!(
            "Ledger refund update for order {}: {} row(s), amount {}",
            order_id, rows_affected, amount
        );
        Ok(rows_affected > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    gateway_tid: String,
    order_id: i64,
    payed_at: chrono::DateTime<chrono::Utc>,
    payed_amount: Decimal,
    refunded_amount: Decimal,
    captured: String,
}

impl TransactionRow {
    fn into_record(self) -> DomainResult<TransactionRecord> {
        let captured = CaptureState::from_column(&self.captured).ok_or_else(|| {
            DomainError::InternalError(format!("Invalid captured flag: {}", self.captured))
        })?;

        Ok(TransactionRecord {
            gateway_tid: self.gateway_tid,
            order_id: self.order_id,
            paid_amount: self.payed_amount,
            refunded_amount: self.refunded_amount,
            captured,
            paid_at: self.payed_at,
        })
    }
}
