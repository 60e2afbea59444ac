//! # groupbuy-db: Database Layer for Group-Buy
//!
//! This crate provides database access for the group-buy tool.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Group-Buy Data Flow                              │
//! │                                                                         │
//! │  Request handler (edit basket)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    groupbuy-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ WishRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ BasketRepo ───┼──► groupbuy-core │  │   │
//! │  │   │ Management    │    │ ...           │    │  prorata     │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (groupbuy.db)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (order, wish, basket, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groupbuy_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/groupbuy.db")).await?;
//!
//! // Record shipping and prices, prorate them onto the wishes
//! let costing = db.baskets().apply_costs(&basket_id, &edit).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::basket::BasketRepository;
pub use repository::deposit_point::DepositPointRepository;
pub use repository::order::OrderRepository;
pub use repository::user::UserRepository;
pub use repository::wish::WishRepository;
