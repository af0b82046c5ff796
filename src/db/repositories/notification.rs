//! Notification repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Notification, NotificationType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Notification>>;
    /// Newest first
    async fn list(&self) -> Result<Vec<Notification>>;
    /// Returns `false` when the id does not exist
    async fn mark_read(&self, id: i64) -> Result<bool>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxNotificationRepository {
    pool: DynDatabasePool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<Notification> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, notification).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, notification).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Notification>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Notification>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }

    async fn mark_read(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => mark_read_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => mark_read_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.mysql()?, id).await,
        }
    }
}

fn parse_type(id: i64, raw: &str) -> NotificationType {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!("Notification {} has unknown type {:?}", id, raw);
        NotificationType::default()
    })
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, notification: &Notification) -> Result<Notification> {
    let created_at = Utc::now();
    let result = sqlx::query(
        "INSERT INTO notifications (title, message, notification_type, is_read, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.notification_type.to_string())
    .bind(notification.read)
    .bind(created_at)
    .execute(pool)
    .await
    .context("Failed to create notification")?;

    Ok(Notification {
        id: result.last_insert_rowid(),
        created_at,
        ..notification.clone()
    })
}

async fn mark_read_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to mark notification as read")?;
    Ok(result.rows_affected() > 0)
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete notification")?;
    Ok(result.rows_affected() > 0)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Notification>> {
    let row = sqlx::query(
        "SELECT id, title, message, notification_type, is_read, created_at FROM notifications WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get notification")?;
    row.map(|r| row_to_notification_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        "SELECT id, title, message, notification_type, is_read, created_at FROM notifications ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list notifications")?;
    rows.iter().map(row_to_notification_sqlite).collect()
}

fn row_to_notification_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
    let id: i64 = row.try_get("id")?;
    let kind: String = row.try_get("notification_type")?;
    Ok(Notification {
        id,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        notification_type: parse_type(id, &kind),
        created_at: row.try_get("created_at")?,
        read: row.try_get("is_read")?,
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, notification: &Notification) -> Result<Notification> {
    let created_at = Utc::now();
    let result = sqlx::query(
        "INSERT INTO notifications (title, message, notification_type, is_read, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.notification_type.to_string())
    .bind(notification.read)
    .bind(created_at)
    .execute(pool)
    .await
    .context("Failed to create notification")?;

    Ok(Notification {
        id: result.last_insert_id() as i64,
        created_at,
        ..notification.clone()
    })
}

async fn mark_read_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to mark notification as read")?;
    // rows_affected is 0 for an already read row, so check existence instead
    Ok(get_by_id_mysql(pool, id).await?.is_some())
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete notification")?;
    Ok(result.rows_affected() > 0)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Notification>> {
    let row = sqlx::query(
        "SELECT id, title, message, notification_type, is_read, created_at FROM notifications WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get notification")?;
    row.map(|r| row_to_notification_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        "SELECT id, title, message, notification_type, is_read, created_at FROM notifications ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list notifications")?;
    rows.iter().map(row_to_notification_mysql).collect()
}

fn row_to_notification_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Notification> {
    let id: i64 = row.try_get("id")?;
    let kind: String = row.try_get("notification_type")?;
    Ok(Notification {
        id,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        notification_type: parse_type(id, &kind),
        created_at: row.try_get("created_at")?,
        read: row.try_get("is_read")?,
    })
}
