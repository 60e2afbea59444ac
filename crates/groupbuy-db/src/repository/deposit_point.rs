//! # Deposit Point Repository
//!
//! Pickup locations. At most one of them is the default offered to members.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::DbResult;
use groupbuy_core::{CoreError, DepositPoint, ValidationError};

const DEPOSIT_POINT_COLUMNS: &str = "id, name, address, is_default, created_at, updated_at";

/// Repository for deposit point database operations.
#[derive(Debug, Clone)]
pub struct DepositPointRepository {
    pool: SqlitePool,
}

impl DepositPointRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DepositPointRepository { pool }
    }

    /// Adds a pickup location. Marking it as default clears the flag on
    /// every other location in the same transaction.
    pub async fn create(&self, name: &str, address: &str, is_default: bool) -> DbResult<DepositPoint> {
        for (field, value) in [("name", name), ("address", address)] {
            if value.trim().is_empty() {
                return Err(CoreError::from(ValidationError::Required {
                    field: field.to_string(),
                })
                .into());
            }
        }

        let now = Utc::now();
        let point = DepositPoint {
            id: generate_id(),
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            is_default,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        if is_default {
            sqlx::query("UPDATE deposit_points SET is_default = 0, updated_at = ?1 WHERE is_default = 1")
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO deposit_points (id, name, address, is_default, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&point.id)
        .bind(&point.name)
        .bind(&point.address)
        .bind(point.is_default)
        .bind(point.created_at)
        .bind(point.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(id = %point.id, is_default, "Deposit point created");
        Ok(point)
    }

    /// Lists every location, the default one first.
    pub async fn list_all(&self) -> DbResult<Vec<DepositPoint>> {
        let sql = format!(
            "SELECT {DEPOSIT_POINT_COLUMNS} FROM deposit_points ORDER BY is_default DESC, name COLLATE NOCASE"
        );
        let points = sqlx::query_as::<_, DepositPoint>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(points)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DepositPoint>> {
        let sql = format!("SELECT {DEPOSIT_POINT_COLUMNS} FROM deposit_points WHERE id = ?1");
        let point = sqlx::query_as::<_, DepositPoint>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(point)
    }

    /// The location offered by default, if one is set.
    pub async fn get_default(&self) -> DbResult<Option<DepositPoint>> {
        let sql = format!(
            "SELECT {DEPOSIT_POINT_COLUMNS} FROM deposit_points WHERE is_default = 1 LIMIT 1"
        );
        let point = sqlx::query_as::<_, DepositPoint>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_single_default() {
        let db = test_support::database().await;
        let points = db.deposit_points();

        assert!(points.get_default().await.unwrap().is_none());

        let shop = points
            .create("Boutique", "12 rue des Dés, Lyon", true)
            .await
            .unwrap();
        assert_eq!(points.get_default().await.unwrap().unwrap().id, shop.id);

        let club = points
            .create("Club", "3 place du Jeu, Lyon", true)
            .await
            .unwrap();
        points.create("Bar", "8 quai Meeple, Lyon", false).await.unwrap();

        assert_eq!(points.get_default().await.unwrap().unwrap().id, club.id);

        let listed = points.list_all().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Club", "Bar", "Boutique"]);
        assert_eq!(listed.iter().filter(|p| p.is_default).count(), 1);

        let fetched = points.get_by_id(&shop.id).await.unwrap().unwrap();
        assert!(!fetched.is_default);
    }

    #[tokio::test]
    async fn test_wish_pickup_location() {
        let db = test_support::database().await;
        let admin = test_support::user(&db, "admin@example.org").await;
        let order = test_support::order(&db, &admin.id).await;
        let wish = test_support::wish(&db, &order.id, &admin.id, "Cascadia").await;

        let point = db
            .deposit_points()
            .create("Boutique", "12 rue des Dés, Lyon", false)
            .await
            .unwrap();
        db.wishes().set_deposit_point(&wish.id, &point.id).await.unwrap();

        let stored = db.wishes().get_by_id(&wish.id).await.unwrap().unwrap();
        assert_eq!(stored.deposit_point_id.as_deref(), Some(point.id.as_str()));

        let err = db
            .wishes()
            .set_deposit_point(&wish.id, "nowhere")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected() {
        let db = test_support::database().await;
        let err = db.deposit_points().create("Club", "  ", false).await.unwrap_err();
        assert!(err.is_domain());
    }
}
