//! Database layer
//!
//! SQLite is the default backend; MySQL is selected through configuration.
//! Repositories receive a [`DynDatabasePool`] and dispatch on its driver.
//!
//! ```ignore
//! use contentdesk::config::DatabaseConfig;
//! use contentdesk::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! pool.close().await;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
