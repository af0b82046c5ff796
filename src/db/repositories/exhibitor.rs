//! Exhibitor repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Exhibitor, MapPosition};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, name, description, category, location, phone, email, website, logo_url, map_x, map_y, created_at, updated_at";

#[async_trait]
pub trait ExhibitorRepository: Send + Sync {
    async fn create(&self, exhibitor: &Exhibitor) -> Result<Exhibitor>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Exhibitor>>;
    /// Every exhibitor, ordered by name
    async fn list(&self) -> Result<Vec<Exhibitor>>;
    async fn update(&self, exhibitor: &Exhibitor) -> Result<Option<Exhibitor>>;
    /// Returns `false` when no row had that id
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxExhibitorRepository {
    pool: DynDatabasePool,
}

impl SqlxExhibitorRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ExhibitorRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ExhibitorRepository for SqlxExhibitorRepository {
    async fn create(&self, exhibitor: &Exhibitor) -> Result<Exhibitor> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, exhibitor).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, exhibitor).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Exhibitor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Exhibitor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update(&self, exhibitor: &Exhibitor) -> Result<Option<Exhibitor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.sqlite()?, exhibitor).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.mysql()?, exhibitor).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.mysql()?, id).await,
        }
    }
}

fn position(x: Option<f64>, y: Option<f64>) -> Option<MapPosition> {
    match (x, y) {
        (Some(x), Some(y)) => Some(MapPosition { x, y }),
        _ => None,
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, exhibitor: &Exhibitor) -> Result<Exhibitor> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO exhibitors (name, description, category, location, phone, email, website, logo_url, map_x, map_y, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&exhibitor.name)
    .bind(&exhibitor.description)
    .bind(&exhibitor.category)
    .bind(&exhibitor.location)
    .bind(&exhibitor.phone)
    .bind(&exhibitor.email)
    .bind(&exhibitor.website)
    .bind(&exhibitor.logo_url)
    .bind(exhibitor.map_position.map(|p| p.x))
    .bind(exhibitor.map_position.map(|p| p.y))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create exhibitor")?;

    Ok(Exhibitor {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..exhibitor.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Exhibitor>> {
    let row = sqlx::query(&format!("SELECT {} FROM exhibitors WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get exhibitor")?;
    row.map(|r| row_to_exhibitor_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Exhibitor>> {
    let rows = sqlx::query(&format!("SELECT {} FROM exhibitors ORDER BY name, id", COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list exhibitors")?;
    rows.iter().map(row_to_exhibitor_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, exhibitor: &Exhibitor) -> Result<Option<Exhibitor>> {
    let result = sqlx::query(
        "UPDATE exhibitors SET name = ?, description = ?, category = ?, location = ?, phone = ?, email = ?, \
         website = ?, logo_url = ?, map_x = ?, map_y = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&exhibitor.name)
    .bind(&exhibitor.description)
    .bind(&exhibitor.category)
    .bind(&exhibitor.location)
    .bind(&exhibitor.phone)
    .bind(&exhibitor.email)
    .bind(&exhibitor.website)
    .bind(&exhibitor.logo_url)
    .bind(exhibitor.map_position.map(|p| p.x))
    .bind(exhibitor.map_position.map(|p| p.y))
    .bind(Utc::now())
    .bind(exhibitor.id)
    .execute(pool)
    .await
    .context("Failed to update exhibitor")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id_sqlite(pool, exhibitor.id).await
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM exhibitors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete exhibitor")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_exhibitor_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Exhibitor> {
    Ok(Exhibitor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        location: row.try_get("location")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        logo_url: row.try_get("logo_url")?,
        map_position: position(row.try_get("map_x")?, row.try_get("map_y")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, exhibitor: &Exhibitor) -> Result<Exhibitor> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO exhibitors (name, description, category, location, phone, email, website, logo_url, map_x, map_y, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&exhibitor.name)
    .bind(&exhibitor.description)
    .bind(&exhibitor.category)
    .bind(&exhibitor.location)
    .bind(&exhibitor.phone)
    .bind(&exhibitor.email)
    .bind(&exhibitor.website)
    .bind(&exhibitor.logo_url)
    .bind(exhibitor.map_position.map(|p| p.x))
    .bind(exhibitor.map_position.map(|p| p.y))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create exhibitor")?;

    Ok(Exhibitor {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..exhibitor.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Exhibitor>> {
    let row = sqlx::query(&format!("SELECT {} FROM exhibitors WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get exhibitor")?;
    row.map(|r| row_to_exhibitor_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Exhibitor>> {
    let rows = sqlx::query(&format!("SELECT {} FROM exhibitors ORDER BY name, id", COLUMNS))
        .fetch_all(pool)
        .await
        .context("Failed to list exhibitors")?;
    rows.iter().map(row_to_exhibitor_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, exhibitor: &Exhibitor) -> Result<Option<Exhibitor>> {
    sqlx::query(
        "UPDATE exhibitors SET name = ?, description = ?, category = ?, location = ?, phone = ?, email = ?, \
         website = ?, logo_url = ?, map_x = ?, map_y = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&exhibitor.name)
    .bind(&exhibitor.description)
    .bind(&exhibitor.category)
    .bind(&exhibitor.location)
    .bind(&exhibitor.phone)
    .bind(&exhibitor.email)
    .bind(&exhibitor.website)
    .bind(&exhibitor.logo_url)
    .bind(exhibitor.map_position.map(|p| p.x))
    .bind(exhibitor.map_position.map(|p| p.y))
    .bind(Utc::now())
    .bind(exhibitor.id)
    .execute(pool)
    .await
    .context("Failed to update exhibitor")?;

    // MySQL reports 0 affected rows when nothing changed, so re-read instead
    get_by_id_mysql(pool, exhibitor.id).await
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM exhibitors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete exhibitor")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_exhibitor_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Exhibitor> {
    Ok(Exhibitor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        location: row.try_get("location")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        logo_url: row.try_get("logo_url")?,
        map_position: position(row.try_get("map_x")?, row.try_get("map_y")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
