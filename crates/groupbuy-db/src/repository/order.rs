//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. OPEN         create() → Order { status: Open }                     │
//! │                  members submit wishes                                  │
//! │                                                                         │
//! │  2. IN PROGRESS  update_status(InProgress)                             │
//! │                  administrators batch wishes into baskets              │
//! │                                                                         │
//! │  3. COMPLETED    update_status(Completed)                              │
//! │                  wish submission refused from here on                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use groupbuy_core::validation::CreateOrderInput;
use groupbuy_core::{CoreError, Order, OrderStatus};

const ORDER_COLUMNS: &str = r#"
    id, order_type, target_date, description, status,
    created_by, created_at, updated_at
"#;

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

    /// Opens a new order.
    ///
    /// ## Errors
    /// - `DbError::Domain` when the target date is not in the future
    /// - `DbError::ForeignKeyViolation` when `created_by` is unknown
    pub async fn create(&self, input: &CreateOrderInput, created_by: &str) -> DbResult<Order> {
        let now = Utc::now();
        input.validate(now).map_err(CoreError::from)?;

        let order = Order {
            id: generate_id(),
            order_type: input.order_type,
            target_date: input.target_date,
            description: input.normalized_description(),
            status: OrderStatus::Open,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %order.id, order_type = %order.order_type, "Creating order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_type, target_date, description, status,
                created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_type)
        .bind(order.target_date)
        .bind(&order.description)
        .bind(order.status)
        .bind(&order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists all orders, latest target date first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY target_date DESC");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists orders in the given status, latest target date first.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY target_date DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Moves an order to the next status of its lifecycle.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the order doesn't exist
    /// - `DbError::Domain(InvalidTransition)` when skipping or going back
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let mut order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        if !order.status.can_transition_to(next) {
            return Err(CoreError::invalid_transition("Order", id, order.status, next).into());
        }

        let now = Utc::now();
        // Guard on the current status so a concurrent change is not overwritten
        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(id)
        .bind(next)
        .bind(now)
        .bind(order.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        tx.commit().await?;

        info!(id = %id, from = %order.status, to = %next, "Order status changed");

        order.status = next;
        order.updated_at = now;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use chrono::Duration;
    use groupbuy_core::OrderType;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;

        let order = test_support::order(&db, &admin.id).await;
        assert_eq!(order.status, OrderStatus::Open);

        let fetched = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched.order_type, OrderType::Monthly);
        assert_eq!(fetched.description.as_deref(), Some("Commande de février"));
        assert_eq!(fetched.created_by, admin.id);

        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_past_target_date_is_rejected() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;

        let input = CreateOrderInput {
            order_type: OrderType::Special,
            target_date: Utc::now() - Duration::days(1),
            description: None,
        };
        let err = db.orders().create(&input, &admin.id).await.unwrap_err();
        assert!(err.is_domain());
    }

    #[tokio::test]
    async fn test_unknown_creator_is_rejected() {
        let db = test_support::database().await;
        let input = CreateOrderInput {
            order_type: OrderType::Monthly,
            target_date: Utc::now() + Duration::days(3),
            description: None,
        };
        let err = db.orders().create(&input, "ghost").await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_by_status_and_order() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;

        let soon = CreateOrderInput {
            order_type: OrderType::PrivateSale,
            target_date: Utc::now() + Duration::days(2),
            description: None,
        };
        let later = CreateOrderInput {
            order_type: OrderType::Monthly,
            target_date: Utc::now() + Duration::days(30),
            description: None,
        };
        let soon = db.orders().create(&soon, &admin.id).await.unwrap();
        let later = db.orders().create(&later, &admin.id).await.unwrap();

        let all = db.orders().list_all().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![later.id.as_str(), soon.id.as_str()]);

        db.orders()
            .update_status(&soon.id, OrderStatus::InProgress)
            .await
            .unwrap();

        let open = db.orders().list_by_status(OrderStatus::Open).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, later.id);

        let in_progress = db
            .orders()
            .list_by_status(OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(in_progress[0].id, soon.id);
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;

        let err = db
            .orders()
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidTransition { .. })
        ));

        let order = db
            .orders()
            .update_status(&order.id, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);

        let order = db
            .orders()
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);

        let err = db
            .orders()
            .update_status("missing", OrderStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
