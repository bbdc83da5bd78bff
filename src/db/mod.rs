//! Database layer
//!
//! SQLite pool creation, embedded migrations and one repository per entity.
//!
//! # Usage
//!
//! ```ignore
//! use actunews::config::DatabaseConfig;
//! use actunews::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping};
