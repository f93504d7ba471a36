use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::Amount;
use crate::ports::order_store_port::OrderStorePort;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;

/// Thin adapter over the store's order tables. Order management proper
/// belongs to the store; this only registers paid orders, moves statuses
/// and files private notes.
#[derive(Clone)]
pub struct MySqlOrderStore {
    pool: Arc<Pool<MySql>>,
}

impl MySqlOrderStore {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStorePort for MySqlOrderStore {
    async fn validate_order(
        &self,
        cart_id: i64,
        order_status_id: i32,
        amount: &Amount,
        payment_label: &str,
        transaction_id: &str,
    ) -> DomainResult<i64> {
        let query = r#"
            INSERT INTO orders (
                cart_id, current_state, total_paid, currency,
                payment_method, payment_reference, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(cart_id)
            .bind(order_status_id)
            .bind(amount.value)
            .bind(&amount.currency)
            .bind(payment_label)
            .bind(transaction_id)
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| DomainError::OrderStoreError(e.to_string()))?;

        let order_id = result.last_insert_id() as i64;
        debug!("Order {} registered for cart {}", order_id, cart_id);
        Ok(order_id)
    }

    async fn set_order_status(&self, order_id: i64, status_id: i32) -> DomainResult<()> {
        let rows_affected = sqlx::query("UPDATE orders SET current_state = ? WHERE id = ?")
            .bind(status_id)
            .bind(order_id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(DomainError::OrderStoreError(format!(
                "No order found to update: {}",
                order_id
            )));
        }

        sqlx::query("INSERT INTO order_state_history (order_id, state_id, created_at) VALUES (?, ?, ?)")
            .bind(order_id)
            .bind(status_id)
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;

        debug!("Order {} moved to status {}", order_id, status_id);
        Ok(())
    }

    async fn append_order_note(&self, order_id: i64, note: &str) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO order_notes (order_id, message, private, created_at) VALUES (?, ?, 1, ?)",
        )
        .bind(order_id)
        .bind(note)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        debug!("Order note appended for order {}", order_id);
        Ok(())
    }
}
