//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request handler                                                        │
//! │       │                                                                 │
//! │       │  db.baskets().apply_costs(&basket_id, &edit)                   │
//! │       ▼                                                                 │
//! │  BasketRepository                                                      │
//! │  ├── validates and prorates through groupbuy-core                      │
//! │  └── writes basket + wish rows in one transaction                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Orders and their lifecycle
//! - [`WishRepository`](wish::WishRepository) - Member wishes
//! - [`BasketRepository`](basket::BasketRepository) - Baskets, costing workflow
//! - [`DepositPointRepository`](deposit_point::DepositPointRepository) - Pickup locations
//! - [`UserRepository`](user::UserRepository) - Members

pub mod basket;
pub mod deposit_point;
pub mod order;
pub mod user;
pub mod wish;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use chrono::{Duration, Utc};
    use groupbuy_core::validation::{CreateOrderInput, CreateWishInput};
    use groupbuy_core::{Order, OrderType, User, Wish};

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn user(db: &Database, email: &str) -> User {
        db.users().create("Member", email, None).await.unwrap()
    }

    pub async fn order(db: &Database, created_by: &str) -> Order {
        let input = CreateOrderInput {
            order_type: OrderType::Monthly,
            target_date: Utc::now() + Duration::days(14),
            description: Some("Commande de février".to_string()),
        };
        db.orders().create(&input, created_by).await.unwrap()
    }

    pub async fn wish(db: &Database, order_id: &str, user_id: &str, game: &str) -> Wish {
        let input = CreateWishInput {
            order_id: order_id.to_string(),
            game_name: game.to_string(),
            publisher_reference: format!("REF-{game}"),
            publisher_url: None,
        };
        db.wishes().create(&input, user_id).await.unwrap()
    }
}
