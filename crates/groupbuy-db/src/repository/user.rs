//! # User Repository
//!
//! Members of the group. Accounts and sessions belong to the
//! authentication layer; this repository only keeps what orders, wishes and
//! baskets reference.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use groupbuy_core::validation::ValidationResult;
use groupbuy_core::{CoreError, User, UserSummary, ValidationError};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a member.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` when the email is already taken
    pub async fn create(&self, name: &str, email: &str, role: Option<&str>) -> DbResult<User> {
        validate_user(name, email).map_err(CoreError::from)?;

        let user = User {
            id: generate_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            role: role.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %user.id, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: user.email.clone(),
            },
            other => other,
        })?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists every member as shown to administrators, sorted by name.
    pub async fn list_summaries(&self) -> DbResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email FROM users ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

fn validate_user(name: &str, email: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must contain '@'".to_string(),
        });
    }
    Ok(())
}
