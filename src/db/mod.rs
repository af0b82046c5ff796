//! Database layer
//!
//! The fair's content lives in SQLite (default, single-binary deployment) or
//! MySQL, selected by configuration. Repositories in [`repositories`] hold the
//! SQL for both dialects behind one trait per entity.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
