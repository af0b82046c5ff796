//! Settings repository
//!
//! Site settings are stored as key/value rows so new keys need no migration.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn get_all(&self) -> Result<HashMap<String, String>>;

    /// Write every pair in one transaction
    async fn set_many(&self, settings: &HashMap<String, String>) -> Result<()>;
}

pub struct SqlxSettingsRepository {
    pool: DynDatabasePool,
}

impl SqlxSettingsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SettingsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(self.pool.sqlite()?, key).await,
            DatabaseDriver::Mysql => get_mysql(self.pool.mysql()?, key).await,
        }
    }

    async fn get_all(&self) -> Result<HashMap<String, String>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_all_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => get_all_mysql(self.pool.mysql()?).await,
        }
    }

    async fn set_many(&self, settings: &HashMap<String, String>) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => set_many_sqlite(self.pool.sqlite()?, settings).await,
            DatabaseDriver::Mysql => set_many_mysql(self.pool.mysql()?, settings).await,
        }
    }
}

// SQLite implementations
async fn get_sqlite(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get setting")?;
    Ok(row.map(|r| r.try_get("value")).transpose()?)
}

async fn get_all_sqlite(pool: &SqlitePool) -> Result<HashMap<String, String>> {
    let rows = sqlx::query("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await
        .context("Failed to list settings")?;
    rows.iter()
        .map(|r| -> Result<(String, String)> { Ok((r.try_get("key")?, r.try_get("value")?)) })
        .collect()
}

async fn set_many_sqlite(pool: &SqlitePool, settings: &HashMap<String, String>) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (key, value) in settings {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to save setting {}", key))?;
    }
    tx.commit().await.context("Failed to commit settings")?;
    Ok(())
}

// MySQL implementations
async fn get_mysql(pool: &MySqlPool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM settings WHERE `key` = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get setting")?;
    Ok(row.map(|r| r.try_get("value")).transpose()?)
}

async fn get_all_mysql(pool: &MySqlPool) -> Result<HashMap<String, String>> {
    let rows = sqlx::query("SELECT `key`, value FROM settings")
        .fetch_all(pool)
        .await
        .context("Failed to list settings")?;
    rows.iter()
        .map(|r| -> Result<(String, String)> { Ok((r.try_get("key")?, r.try_get("value")?)) })
        .collect()
}

async fn set_many_mysql(pool: &MySqlPool, settings: &HashMap<String, String>) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (key, value) in settings {
        sqlx::query(
            "INSERT INTO settings (`key`, value) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE value = VALUES(value)",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to save setting {}", key))?;
    }
    tx.commit().await.context("Failed to commit settings")?;
    Ok(())
}
