//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Checkout Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Order Persistence                                  │
//! │                                                                     │
//! │  insert_with_items(order, items)                                    │
//! │     └── BEGIN                                                       │
//! │         ├── INSERT order header (idempotency_key UNIQUE)            │
//! │         ├── INSERT each item snapshot                               │
//! │         └── COMMIT   ← header and items land together or not at all │
//! │                                                                     │
//! │  find_by_idempotency_key(key)                                       │
//! │     └── lets a retried checkout discover the order it already made  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pdv_core::{Order, OrderItem};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order header and all its items in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Item rows carry frozen name/price/addon data; later catalog
    /// changes never rewrite sale history.
    ///
    /// ## Idempotency
    /// The header's `idempotency_key` is UNIQUE. A duplicate submission
    /// fails with `DbError::UniqueViolation` and the caller resumes via
    /// [`find_by_idempotency_key`](Self::find_by_idempotency_key).
    pub async fn insert_with_items(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, order_code = %order.order_code, items = items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, store_id, order_code, customer_name, customer_phone,
                order_type, payment_method, subtotal, discount, total_amount,
                status, notes, idempotency_key, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.store_id)
        .bind(&order.order_code)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.order_type)
        .bind(&order.payment_method)
        .bind(order.subtotal)
        .bind(order.discount)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(&order.notes)
        .bind(&order.idempotency_key)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, name_snapshot, quantity,
                    unit_price, addon_total, total_price, notes, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.addon_total)
            .bind(item.total_price)
            .bind(&item.notes)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, store_id, order_code, customer_name, customer_phone,
                   order_type, payment_method, subtotal, discount, total_amount,
                   status, notes, idempotency_key, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Looks up an order by its checkout idempotency key.
    pub async fn find_by_idempotency_key(&self, key: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, store_id, order_code, customer_name, customer_phone,
                   order_type, payment_method, subtotal, discount, total_amount,
                   status, notes, idempotency_key, created_at
            FROM orders
            WHERE idempotency_key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, name_snapshot, quantity,
                   unit_price, addon_total, total_price, notes, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use pdv_core::{Money, OrderStatus, OrderType};
    use uuid::Uuid;

    fn sample_order(key: &str) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            store_id: Uuid::new_v4().to_string(),
            order_code: "PDV-1".to_string(),
            customer_name: "Cliente PDV".to_string(),
            customer_phone: String::new(),
            order_type: OrderType::Counter,
            payment_method: "cash".to_string(),
            subtotal: Money::from_cents(4400),
            discount: Money::zero(),
            total_amount: Money::from_cents(4400),
            status: OrderStatus::Confirmed,
            notes: None,
            idempotency_key: key.to_string(),
            created_at: Utc::now(),
        }
    }

    fn sample_item(order_id: &str) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: Uuid::new_v4().to_string(),
            name_snapshot: "X-Burger".to_string(),
            quantity: 2,
            unit_price: Money::from_cents(2200),
            addon_total: Money::zero(),
            total_price: Money::from_cents(4400),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = sample_order("key-1");
        let items = vec![sample_item(&order.id)];
        repo.insert_with_items(&order, &items).await.unwrap();

        let fetched = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched.order_code, "PDV-1");
        assert_eq!(fetched.total_amount, Money::from_cents(4400));
        assert_eq!(fetched.order_type, OrderType::Counter);

        let fetched_items = repo.get_items(&order.id).await.unwrap();
        assert_eq!(fetched_items.len(), 1);
        assert_eq!(fetched_items[0].quantity, 2);
        assert_eq!(fetched_items[0].unit_price, Money::from_cents(2200));
    }

    #[tokio::test]
    async fn test_duplicate_idempotency_key_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let first = sample_order("same-key");
        repo.insert_with_items(&first, &[]).await.unwrap();

        let second = sample_order("same-key");
        let err = repo.insert_with_items(&second, &[]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // the retried submission can recover the original order
        let existing = repo
            .find_by_idempotency_key("same-key")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(existing.id, first.id);
    }

    #[tokio::test]
    async fn test_find_by_idempotency_key_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let found = db.orders().find_by_idempotency_key("nope").await.unwrap();
        assert!(found.is_none());
    }
}
