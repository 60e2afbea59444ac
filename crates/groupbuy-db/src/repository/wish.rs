//! # Wish Repository
//!
//! Database operations for member wishes.
//!
//! Money columns (`unit_price_cents`, shares, `amount_due_cents`) are only
//! written by [`BasketRepository::apply_costs`](super::basket::BasketRepository::apply_costs)
//! and only cleared when a wish is refused or its basket dissolved; this
//! repository handles submission, listing and status changes.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use groupbuy_core::validation::CreateWishInput;
use groupbuy_core::{CoreError, PaymentStatus, Wish, WishStatus};

pub(crate) const WISH_COLUMNS: &str = r#"
    id, game_name, publisher_reference, publisher_url, status,
    unit_price_cents, shipping_share_cents, customs_share_cents, amount_due_cents,
    payment_status, payment_sent_at, payment_received_at, amount_paid_cents, picked_up_at,
    user_id, order_id, basket_id, deposit_point_id, created_at, updated_at
"#;

/// Repository for wish database operations.
#[derive(Debug, Clone)]
pub struct WishRepository {
    pool: SqlitePool,
}

impl WishRepository {
    /// Creates a new WishRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WishRepository { pool }
    }

    /// Submits a wish on behalf of `user_id`.
    ///
    /// ## Errors
    /// - `DbError::Domain(Validation)` for malformed input
    /// - `DbError::NotFound` when the order doesn't exist
    /// - `DbError::Domain(OrderClosed)` when the order is completed
    pub async fn create(&self, input: &CreateWishInput, user_id: &str) -> DbResult<Wish> {
        input.validate().map_err(CoreError::from)?;

        let order_status: Option<groupbuy_core::OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(&input.order_id)
                .fetch_optional(&self.pool)
                .await?;

        let order_status = order_status.ok_or_else(|| DbError::not_found("Order", &input.order_id))?;
        if !order_status.accepts_wishes() {
            return Err(CoreError::OrderClosed {
                order_id: input.order_id.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let wish = Wish {
            id: generate_id(),
            game_name: input.game_name.trim().to_string(),
            publisher_reference: input.publisher_reference.trim().to_string(),
            publisher_url: input.normalized_url(),
            status: WishStatus::Submitted,
            unit_price_cents: None,
            shipping_share_cents: None,
            customs_share_cents: None,
            amount_due_cents: None,
            payment_status: PaymentStatus::Pending,
            payment_sent_at: None,
            payment_received_at: None,
            amount_paid_cents: None,
            picked_up_at: None,
            user_id: user_id.to_string(),
            order_id: input.order_id.clone(),
            basket_id: None,
            deposit_point_id: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %wish.id, order_id = %wish.order_id, "Creating wish");

        sqlx::query(
            r#"
            INSERT INTO wishes (
                id, game_name, publisher_reference, publisher_url, status,
                payment_status, user_id, order_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&wish.id)
        .bind(&wish.game_name)
        .bind(&wish.publisher_reference)
        .bind(&wish.publisher_url)
        .bind(wish.status)
        .bind(wish.payment_status)
        .bind(&wish.user_id)
        .bind(&wish.order_id)
        .bind(wish.created_at)
        .bind(wish.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(wish)
    }

    /// Gets a wish by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Wish>> {
        let sql = format!("SELECT {WISH_COLUMNS} FROM wishes WHERE id = ?1");
        let wish = sqlx::query_as::<_, Wish>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(wish)
    }

    /// Lists the wishes of an order in submission order.
    pub async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Wish>> {
        let sql = format!(
            "SELECT {WISH_COLUMNS} FROM wishes WHERE order_id = ?1 ORDER BY created_at, rowid"
        );
        let wishes = sqlx::query_as::<_, Wish>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(wishes)
    }

    /// Lists a member's wishes, most recent first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Wish>> {
        let sql = format!(
            "SELECT {WISH_COLUMNS} FROM wishes WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        );
        let wishes = sqlx::query_as::<_, Wish>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(wishes)
    }

    /// Lists the wishes of an order in a given status, e.g. the `submitted`
    /// ones an administrator can still batch.
    pub async fn list_by_order_and_status(
        &self,
        order_id: &str,
        status: WishStatus,
    ) -> DbResult<Vec<Wish>> {
        let sql = format!(
            "SELECT {WISH_COLUMNS} FROM wishes WHERE order_id = ?1 AND status = ?2 ORDER BY created_at, rowid"
        );
        let wishes = sqlx::query_as::<_, Wish>(&sql)
            .bind(order_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(wishes)
    }

    /// Lists the wishes batched into a basket, in the order they were
    /// submitted. This is also the order costs are prorated in.
    pub async fn list_by_basket(&self, basket_id: &str) -> DbResult<Vec<Wish>> {
        let sql = format!(
            "SELECT {WISH_COLUMNS} FROM wishes WHERE basket_id = ?1 ORDER BY created_at, rowid"
        );
        let wishes = sqlx::query_as::<_, Wish>(&sql)
            .bind(basket_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(wishes)
    }

    /// Moves a wish along its lifecycle.
    ///
    /// Joining or leaving a basket goes through
    /// [`BasketRepository`](super::basket::BasketRepository), which keeps
    /// `basket_id` consistent; this method refuses those two transitions.
    /// Refusing a wish takes it out of its basket and clears its price and
    /// shares, so the basket must be costed again before validation.
    /// Reaching `picked_up` stamps `picked_up_at`.
    pub async fn update_status(&self, id: &str, next: WishStatus) -> DbResult<Wish> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {WISH_COLUMNS} FROM wishes WHERE id = ?1");
        let wish = sqlx::query_as::<_, Wish>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Wish", id))?;

        let basket_move = matches!(
            (wish.status, next),
            (WishStatus::Submitted, WishStatus::InBasket) | (WishStatus::InBasket, WishStatus::Submitted)
        );
        if basket_move || !wish.status.can_transition_to(next) {
            return Err(CoreError::invalid_transition("Wish", id, wish.status, next).into());
        }

        let now = Utc::now();
        let picked_up_at = (next == WishStatus::PickedUp).then_some(now);
        let refused = next == WishStatus::Refused;

        let result = sqlx::query(
            r#"
            UPDATE wishes SET
                status = ?2,
                picked_up_at = COALESCE(?3, picked_up_at),
                basket_id = CASE WHEN ?6 THEN NULL ELSE basket_id END,
                unit_price_cents = CASE WHEN ?6 THEN NULL ELSE unit_price_cents END,
                shipping_share_cents = CASE WHEN ?6 THEN NULL ELSE shipping_share_cents END,
                customs_share_cents = CASE WHEN ?6 THEN NULL ELSE customs_share_cents END,
                amount_due_cents = CASE WHEN ?6 THEN NULL ELSE amount_due_cents END,
                updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(picked_up_at)
        .bind(now)
        .bind(wish.status)
        .bind(refused)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Wish", id));
        }

        tx.commit().await?;

        info!(id = %id, from = %wish.status, to = %next, "Wish status changed");
        if refused {
            if let Some(basket_id) = &wish.basket_id {
                debug!(id = %id, basket_id = %basket_id, "Refused wish left its basket");
            }
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Wish", id))
    }

    /// Chooses where the member collects the game.
    pub async fn set_deposit_point(&self, id: &str, deposit_point_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE wishes SET deposit_point_id = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(deposit_point_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Wish", id));
        }
        Ok(())
    }

    /// Withdraws a wish that has not been batched yet.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the wish doesn't exist or is already in a
    ///   basket
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM wishes WHERE id = ?1 AND status = 'submitted' AND basket_id IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Wish (submitted)", id));
        }

        debug!(id = %id, "Wish deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use groupbuy_core::OrderStatus;

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let member = test_support::user(&db, "member@example.org").await;
        let order = test_support::order(&db, &admin.id).await;

        let first = test_support::wish(&db, &order.id, &member.id, "Cascadia").await;
        let second = test_support::wish(&db, &order.id, &admin.id, "Azul").await;

        assert_eq!(first.status, WishStatus::Submitted);
        assert_eq!(first.payment_status, PaymentStatus::Pending);
        assert!(first.unit_price_cents.is_none());

        let by_order = db.wishes().list_by_order(&order.id).await.unwrap();
        let names: Vec<&str> = by_order.iter().map(|w| w.game_name.as_str()).collect();
        assert_eq!(names, vec!["Cascadia", "Azul"]);

        let mine = db.wishes().list_by_user(&member.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, first.id);

        let submitted = db
            .wishes()
            .list_by_order_and_status(&order.id, WishStatus::Submitted)
            .await
            .unwrap();
        assert_eq!(submitted.len(), 2);
        assert!(submitted.iter().any(|w| w.id == second.id));
    }

    #[tokio::test]
    async fn test_empty_url_is_stored_as_none() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;

        let input = CreateWishInput {
            order_id: order.id.clone(),
            game_name: " Ark Nova ".to_string(),
            publisher_reference: "PHI-1".to_string(),
            publisher_url: Some(String::new()),
        };
        let wish = db.wishes().create(&input, &admin.id).await.unwrap();
        let stored = db.wishes().get_by_id(&wish.id).await.unwrap().unwrap();

        assert_eq!(stored.game_name, "Ark Nova");
        assert!(stored.publisher_url.is_none());
    }

    #[tokio::test]
    async fn test_completed_order_refuses_wishes() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;

        db.orders()
            .update_status(&order.id, OrderStatus::InProgress)
            .await
            .unwrap();
        // Still accepted while baskets are being prepared
        test_support::wish(&db, &order.id, &admin.id, "Late pledge").await;

        db.orders()
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();

        let input = CreateWishInput {
            order_id: order.id.clone(),
            game_name: "Too late".to_string(),
            publisher_reference: "PHI-2".to_string(),
            publisher_url: None,
        };
        let err = db.wishes().create(&input, &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderClosed { .. })));
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;

        let input = CreateWishInput {
            order_id: "missing".to_string(),
            game_name: "Cascadia".to_string(),
            publisher_reference: "PHI-3".to_string(),
            publisher_url: None,
        };
        let err = db.wishes().create(&input, &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_status_changes_outside_baskets_are_guarded() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;
        let wish = test_support::wish(&db, &order.id, &admin.id, "Cascadia").await;

        // Joining a basket only happens through the basket repository
        let err = db
            .wishes()
            .update_status(&wish.id, WishStatus::InBasket)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));

        let err = db
            .wishes()
            .update_status(&wish.id, WishStatus::Paid)
            .await
            .unwrap_err();
        assert!(err.is_domain());
    }

    #[tokio::test]
    async fn test_delete_only_unbatched_wishes() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;
        let wish = test_support::wish(&db, &order.id, &admin.id, "Cascadia").await;

        db.wishes().delete(&wish.id).await.unwrap();
        assert!(db.wishes().get_by_id(&wish.id).await.unwrap().is_none());

        let err = db.wishes().delete(&wish.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
