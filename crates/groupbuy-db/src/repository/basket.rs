//! # Basket Repository
//!
//! Database operations for baskets and the costing workflow.
//!
//! ## Basket Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. BATCH        create(order, wish_ids)                               │
//! │                  wishes: submitted → in_basket                          │
//! │                                                                         │
//! │  2. COST         apply_costs(basket, edit)     (draft, awaiting_valid.) │
//! │                  cost_basket() prorates shipping + customs             │
//! │                  shares and amount due written onto every wish         │
//! │                                                                         │
//! │  3. VALIDATE     update_status(Validated)                              │
//! │                  wishes: in_basket → validated, costs frozen           │
//! │                                                                         │
//! │  4. SHIP         awaiting_customs → awaiting_reception                 │
//! │                  → awaiting_delivery (received_at)                     │
//! │                  → available_pickup  (available_at)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every multi-row step runs in a single transaction: either all wishes of
//! the basket change, or none do.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::generate_id;
use super::wish::{WishRepository, WISH_COLUMNS};
use crate::error::{DbError, DbResult};
use groupbuy_core::validation::{CreateBasketInput, EditBasketInput};
use groupbuy_core::{
    cost_basket, Basket, BasketCosting, BasketStatus, BasketWithWishes, CoreError, Wish,
    WishStatus,
};

const BASKET_COLUMNS: &str = r#"
    id, name, status, shipping_cost_cents, customs_cost_cents,
    order_id, created_by, received_at, available_at, created_at, updated_at
"#;

/// Repository for basket database operations.
#[derive(Debug, Clone)]
pub struct BasketRepository {
    pool: SqlitePool,
}

impl BasketRepository {
    /// Creates a new BasketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BasketRepository { pool }
    }

    fn wishes(&self) -> WishRepository {
        WishRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Batching
    // =========================================================================

    /// Batches wishes of an order into a new draft basket.
    ///
    /// ## Errors
    /// - `DbError::Domain(Validation)` for an empty or duplicated wish list
    /// - `DbError::NotFound` when the order or a wish doesn't exist
    /// - `DbError::Domain(WishNotEligible)` when a wish belongs to another
    ///   order, is already batched or is no longer `submitted`
    pub async fn create(
        &self,
        input: &CreateBasketInput,
        created_by: &str,
    ) -> DbResult<BasketWithWishes> {
        input.validate().map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let order: Option<String> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?1")
            .bind(&input.order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Err(DbError::not_found("Order", &input.order_id));
        }

        let wish_sql = format!("SELECT {WISH_COLUMNS} FROM wishes WHERE id = ?1");
        for wish_id in &input.wish_ids {
            let wish = sqlx::query_as::<_, Wish>(&wish_sql)
                .bind(wish_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Wish", wish_id))?;

            if let Some(reason) = ineligibility(&wish, &input.order_id) {
                return Err(CoreError::WishNotEligible {
                    wish_id: wish_id.clone(),
                    reason: reason.to_string(),
                }
                .into());
            }
        }

        let now = Utc::now();
        let basket = Basket {
            id: generate_id(),
            name: input.name_or_default(now.date_naive()),
            status: BasketStatus::Draft,
            shipping_cost_cents: None,
            customs_cost_cents: None,
            order_id: input.order_id.clone(),
            created_by: created_by.to_string(),
            received_at: None,
            available_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO baskets (
                id, name, status, order_id, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&basket.id)
        .bind(&basket.name)
        .bind(basket.status)
        .bind(&basket.order_id)
        .bind(&basket.created_by)
        .bind(basket.created_at)
        .bind(basket.updated_at)
        .execute(&mut *tx)
        .await?;

        for wish_id in &input.wish_ids {
            sqlx::query(
                "UPDATE wishes SET status = ?2, basket_id = ?3, updated_at = ?4 WHERE id = ?1",
            )
            .bind(wish_id)
            .bind(WishStatus::InBasket)
            .bind(&basket.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %basket.id,
            order_id = %basket.order_id,
            wishes = input.wish_ids.len(),
            "Basket created"
        );

        let wishes = self.wishes().list_by_basket(&basket.id).await?;
        Ok(BasketWithWishes { basket, wishes })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a basket by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Basket>> {
        let sql = format!("SELECT {BASKET_COLUMNS} FROM baskets WHERE id = ?1");
        let basket = sqlx::query_as::<_, Basket>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(basket)
    }

    /// Gets a basket together with its wishes.
    pub async fn get_with_wishes(&self, id: &str) -> DbResult<Option<BasketWithWishes>> {
        let Some(basket) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let wishes = self.wishes().list_by_basket(id).await?;

        Ok(Some(BasketWithWishes { basket, wishes }))
    }

    /// Lists the baskets of an order with their wishes, newest first.
    pub async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<BasketWithWishes>> {
        let sql = format!(
            "SELECT {BASKET_COLUMNS} FROM baskets WHERE order_id = ?1 ORDER BY created_at DESC, rowid DESC"
        );
        let baskets = sqlx::query_as::<_, Basket>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        let wishes = self.wishes();
        let mut result = Vec::with_capacity(baskets.len());
        for basket in baskets {
            let basket_wishes = wishes.list_by_basket(&basket.id).await?;
            result.push(BasketWithWishes {
                basket,
                wishes: basket_wishes,
            });
        }

        Ok(result)
    }

    // =========================================================================
    // Costing
    // =========================================================================

    /// Records the basket's shipping and customs costs and each wish's unit
    /// price, then writes the prorated shares and amount due onto the wishes.
    ///
    /// Re-applying replaces the previous costing.
    ///
    /// ## Errors
    /// - `DbError::Domain(Validation | Prorata)` for an invalid edit
    /// - `DbError::NotFound` when the basket doesn't exist
    /// - `DbError::Domain(BasketLocked)` once the basket is validated
    /// - `DbError::Domain(IncompleteBasketEdit)` when the edit does not price
    ///   exactly the basket's wishes
    /// - `DbError::Domain(WishNotInBasket)` for a wish of another basket
    pub async fn apply_costs(
        &self,
        basket_id: &str,
        input: &EditBasketInput,
    ) -> DbResult<BasketCosting> {
        let costing = cost_basket(input)?;

        let mut tx = self.pool.begin().await?;

        let status: Option<BasketStatus> =
            sqlx::query_scalar("SELECT status FROM baskets WHERE id = ?1")
                .bind(basket_id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status.ok_or_else(|| DbError::not_found("Basket", basket_id))?;

        if !status.is_editable() {
            return Err(CoreError::BasketLocked {
                basket_id: basket_id.to_string(),
                status: status.to_string(),
            }
            .into());
        }

        let in_basket: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishes WHERE basket_id = ?1")
            .bind(basket_id)
            .fetch_one(&mut *tx)
            .await?;
        if in_basket as usize != costing.wishes.len() {
            return Err(CoreError::IncompleteBasketEdit {
                basket_id: basket_id.to_string(),
                expected: in_basket as usize,
                got: costing.wishes.len(),
            }
            .into());
        }

        let now = Utc::now();
        for wish in &costing.wishes {
            let result = sqlx::query(
                r#"
                UPDATE wishes SET
                    unit_price_cents = ?3,
                    shipping_share_cents = ?4,
                    customs_share_cents = ?5,
                    amount_due_cents = ?6,
                    updated_at = ?7
                WHERE id = ?1 AND basket_id = ?2
                "#,
            )
            .bind(&wish.wish_id)
            .bind(basket_id)
            .bind(wish.unit_price.cents())
            .bind(wish.shipping_share.cents())
            .bind(wish.customs_share.cents())
            .bind(wish.amount_due.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::WishNotInBasket {
                    wish_id: wish.wish_id.clone(),
                    basket_id: basket_id.to_string(),
                }
                .into());
            }
        }

        sqlx::query(
            r#"
            UPDATE baskets SET
                shipping_cost_cents = ?2,
                customs_cost_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(basket_id)
        .bind(costing.shipping_cost.cents())
        .bind(costing.customs_cost.map(|c| c.cents()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            id = %basket_id,
            shipping = %costing.shipping_cost,
            customs = %costing.customs_cost.unwrap_or_default(),
            total = %costing.grand_total(),
            "Basket costs applied"
        );

        Ok(costing)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Moves a basket to the next status of its lifecycle.
    ///
    /// Validating the basket validates its wishes. Reaching
    /// `awaiting_delivery` stamps `received_at`, reaching `available_pickup`
    /// stamps `available_at`.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the basket doesn't exist
    /// - `DbError::Domain(InvalidTransition)` when skipping or going back
    /// - `DbError::Domain(BasketNotCosted)` when validating a basket whose
    ///   wish shares don't add up to its recorded costs
    pub async fn update_status(&self, id: &str, next: BasketStatus) -> DbResult<Basket> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {BASKET_COLUMNS} FROM baskets WHERE id = ?1");
        let basket = sqlx::query_as::<_, Basket>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Basket", id))?;

        if !basket.status.can_transition_to(next) {
            return Err(CoreError::invalid_transition("Basket", id, basket.status, next).into());
        }

        if next == BasketStatus::Validated {
            if let Some(reason) = costing_gap(&mut *tx, &basket).await? {
                return Err(CoreError::BasketNotCosted {
                    basket_id: id.to_string(),
                    reason: reason.to_string(),
                }
                .into());
            }
        }

        let now = Utc::now();
        let received_at = (next == BasketStatus::AwaitingDelivery).then_some(now);
        let available_at = (next == BasketStatus::AvailablePickup).then_some(now);

        let result = sqlx::query(
            r#"
            UPDATE baskets SET
                status = ?2,
                received_at = COALESCE(?3, received_at),
                available_at = COALESCE(?4, available_at),
                updated_at = ?5
            WHERE id = ?1 AND status = ?6
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(received_at)
        .bind(available_at)
        .bind(now)
        .bind(basket.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Basket", id));
        }

        if next == BasketStatus::Validated {
            let validated = sqlx::query(
                "UPDATE wishes SET status = ?2, updated_at = ?3 WHERE basket_id = ?1 AND status = ?4",
            )
            .bind(id)
            .bind(WishStatus::Validated)
            .bind(now)
            .bind(WishStatus::InBasket)
            .execute(&mut *tx)
            .await?;
            debug!(id = %id, wishes = validated.rows_affected(), "Basket wishes validated");
        }

        tx.commit().await?;

        info!(id = %id, from = %basket.status, to = %next, "Basket status changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Basket", id))
    }

    /// Dissolves a basket that is not validated yet.
    ///
    /// Its wishes go back to `submitted` with their prices and shares
    /// cleared, ready to be batched again.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let status: Option<BasketStatus> =
            sqlx::query_scalar("SELECT status FROM baskets WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status.ok_or_else(|| DbError::not_found("Basket", id))?;

        if !status.is_editable() {
            return Err(CoreError::BasketLocked {
                basket_id: id.to_string(),
                status: status.to_string(),
            }
            .into());
        }

        let released = sqlx::query(
            r#"
            UPDATE wishes SET
                status = ?2,
                basket_id = NULL,
                unit_price_cents = NULL,
                shipping_share_cents = NULL,
                customs_share_cents = NULL,
                amount_due_cents = NULL,
                updated_at = ?3
            WHERE basket_id = ?1
            "#,
        )
        .bind(id)
        .bind(WishStatus::Submitted)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM baskets WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, released = released.rows_affected(), "Basket deleted");
        Ok(())
    }
}

/// Why the basket's costing is not complete, if it isn't.
///
/// Complete means costs were applied, every wish has an amount due, and the
/// wishes' shares add up exactly to the basket's shipping and customs costs.
async fn costing_gap(
    conn: &mut SqliteConnection,
    basket: &Basket,
) -> DbResult<Option<&'static str>> {
    let Some(shipping_cost) = basket.shipping_cost_cents else {
        return Ok(Some("no shipping cost recorded"));
    };

    let (wishes, costed, shipping_total, customs_total) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(amount_due_cents),
                COALESCE(SUM(shipping_share_cents), 0),
                COALESCE(SUM(customs_share_cents), 0)
            FROM wishes
            WHERE basket_id = ?1
            "#,
        )
        .bind(&basket.id)
        .fetch_one(&mut *conn)
        .await?;

    let gap = if wishes == 0 {
        Some("it holds no wishes")
    } else if costed < wishes {
        Some("some wishes have no amount due")
    } else if shipping_total != shipping_cost
        || customs_total != basket.customs_cost_cents.unwrap_or(0)
    {
        Some("wish shares no longer add up to the basket costs")
    } else {
        None
    };

    Ok(gap)
}

/// Why a wish cannot join a basket of `order_id`, if it can't.
fn ineligibility(wish: &Wish, order_id: &str) -> Option<&'static str> {
    if wish.order_id != order_id {
        Some("it belongs to another order")
    } else if wish.basket_id.is_some() {
        Some("it is already in a basket")
    } else if wish.status != WishStatus::Submitted {
        Some("it is no longer submitted")
    } else {
        None
    }
}
