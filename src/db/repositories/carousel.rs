//! Carousel slide repository
//!
//! `sort_order` is kept as a dense 1..=n sequence: new slides append at the
//! end, deletes close the gap and reorders rewrite every position inside one
//! transaction.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::CarouselSlide;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;

const COLUMNS: &str = "id, title, description, image, link, sort_order, active, created_at, updated_at";

/// Result of a reorder request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Applied,
    /// Nothing was written; these ids do not exist
    UnknownIds(Vec<i64>),
}

#[async_trait]
pub trait CarouselRepository: Send + Sync {
    async fn create(&self, slide: &CarouselSlide) -> Result<CarouselSlide>;
    async fn get_by_id(&self, id: i64) -> Result<Option<CarouselSlide>>;
    /// Slides in display order, optionally only the active ones
    async fn list(&self, active_only: bool) -> Result<Vec<CarouselSlide>>;
    /// Content fields only; position changes go through `reorder`
    async fn update(&self, slide: &CarouselSlide) -> Result<Option<CarouselSlide>>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn reorder(&self, ids: &[i64]) -> Result<ReorderOutcome>;
}

pub struct SqlxCarouselRepository {
    pool: DynDatabasePool,
}

impl SqlxCarouselRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CarouselRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarouselRepository for SqlxCarouselRepository {
    async fn create(&self, slide: &CarouselSlide) -> Result<CarouselSlide> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, slide).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, slide).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CarouselSlide>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self, active_only: bool) -> Result<Vec<CarouselSlide>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?, active_only).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?, active_only).await,
        }
    }

    async fn update(&self, slide: &CarouselSlide) -> Result<Option<CarouselSlide>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.sqlite()?, slide).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.mysql()?, slide).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn reorder(&self, ids: &[i64]) -> Result<ReorderOutcome> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => reorder_sqlite(self.pool.sqlite()?, ids).await,
            DatabaseDriver::Mysql => reorder_mysql(self.pool.mysql()?, ids).await,
        }
    }
}

/// Final `(id, sort_order)` pairs for a reorder request.
///
/// `current` is every slide id in its present display order. Requested ids
/// come first in the given order; slides left out keep their relative order
/// after them. Unknown ids reject the whole plan.
pub fn plan_order(current: &[i64], requested: &[i64]) -> std::result::Result<Vec<(i64, i32)>, Vec<i64>> {
    let existing: HashSet<i64> = current.iter().copied().collect();
    let unknown: Vec<i64> = requested
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }

    let mut seen = HashSet::new();
    let ordered = requested
        .iter()
        .chain(current.iter())
        .copied()
        .filter(|id| seen.insert(*id));

    Ok(ordered
        .enumerate()
        .map(|(position, id)| (id, position as i32 + 1))
        .collect())
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, slide: &CarouselSlide) -> Result<CarouselSlide> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO carousel_slides (title, description, image, link, sort_order, active, created_at, updated_at) \
         SELECT ?, ?, ?, ?, COALESCE(MAX(sort_order), 0) + 1, ?, ?, ? FROM carousel_slides",
    )
    .bind(&slide.title)
    .bind(&slide.description)
    .bind(&slide.image)
    .bind(&slide.link)
    .bind(slide.active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create carousel slide")?;

    get_by_id_sqlite(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Carousel slide not found after insert"))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<CarouselSlide>> {
    let row = sqlx::query(&format!("SELECT {} FROM carousel_slides WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get carousel slide")?;
    row.map(|r| row_to_slide_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, active_only: bool) -> Result<Vec<CarouselSlide>> {
    let filter = if active_only { "WHERE active = 1" } else { "" };
    let rows = sqlx::query(&format!(
        "SELECT {} FROM carousel_slides {} ORDER BY sort_order, id",
        COLUMNS, filter
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list carousel slides")?;
    rows.iter().map(row_to_slide_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, slide: &CarouselSlide) -> Result<Option<CarouselSlide>> {
    let result = sqlx::query(
        "UPDATE carousel_slides SET title = ?, description = ?, image = ?, link = ?, active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&slide.title)
    .bind(&slide.description)
    .bind(&slide.image)
    .bind(&slide.link)
    .bind(slide.active)
    .bind(Utc::now())
    .bind(slide.id)
    .execute(pool)
    .await
    .context("Failed to update carousel slide")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id_sqlite(pool, slide.id).await
}

async fn ordered_ids_sqlite(conn: &mut sqlx::SqliteConnection) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT id FROM carousel_slides ORDER BY sort_order, id")
        .fetch_all(&mut *conn)
        .await
        .context("Failed to read carousel order")?;
    rows.iter()
        .map(|r| r.try_get::<i64, _>("id").map_err(Into::into))
        .collect()
}

async fn write_order_sqlite(conn: &mut sqlx::SqliteConnection, plan: &[(i64, i32)]) -> Result<()> {
    for (id, order) in plan {
        sqlx::query("UPDATE carousel_slides SET sort_order = ? WHERE id = ?")
            .bind(order)
            .bind(id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to move carousel slide {}", id))?;
    }
    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM carousel_slides WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete carousel slide")?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    let remaining = ordered_ids_sqlite(&mut tx).await?;
    let plan = plan_order(&remaining, &[]).unwrap_or_default();
    write_order_sqlite(&mut tx, &plan).await?;
    tx.commit().await?;
    Ok(true)
}

async fn reorder_sqlite(pool: &SqlitePool, ids: &[i64]) -> Result<ReorderOutcome> {
    let mut tx = pool.begin().await?;
    let current = ordered_ids_sqlite(&mut tx).await?;
    let plan = match plan_order(&current, ids) {
        Ok(plan) => plan,
        // Dropping the transaction rolls it back
        Err(unknown) => return Ok(ReorderOutcome::UnknownIds(unknown)),
    };
    write_order_sqlite(&mut tx, &plan).await?;
    tx.commit().await.context("Failed to commit carousel reorder")?;
    Ok(ReorderOutcome::Applied)
}

fn row_to_slide_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<CarouselSlide> {
    Ok(CarouselSlide {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        link: row.try_get("link")?,
        sort_order: row.try_get("sort_order")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, slide: &CarouselSlide) -> Result<CarouselSlide> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO carousel_slides (title, description, image, link, sort_order, active, created_at, updated_at) \
         SELECT ?, ?, ?, ?, COALESCE(MAX(sort_order), 0) + 1, ?, ?, ? FROM carousel_slides",
    )
    .bind(&slide.title)
    .bind(&slide.description)
    .bind(&slide.image)
    .bind(&slide.link)
    .bind(slide.active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create carousel slide")?;

    get_by_id_mysql(pool, result.last_insert_id() as i64)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Carousel slide not found after insert"))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<CarouselSlide>> {
    let row = sqlx::query(&format!("SELECT {} FROM carousel_slides WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get carousel slide")?;
    row.map(|r| row_to_slide_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool, active_only: bool) -> Result<Vec<CarouselSlide>> {
    let filter = if active_only { "WHERE active = TRUE" } else { "" };
    let rows = sqlx::query(&format!(
        "SELECT {} FROM carousel_slides {} ORDER BY sort_order, id",
        COLUMNS, filter
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list carousel slides")?;
    rows.iter().map(row_to_slide_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, slide: &CarouselSlide) -> Result<Option<CarouselSlide>> {
    sqlx::query(
        "UPDATE carousel_slides SET title = ?, description = ?, image = ?, link = ?, active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&slide.title)
    .bind(&slide.description)
    .bind(&slide.image)
    .bind(&slide.link)
    .bind(slide.active)
    .bind(Utc::now())
    .bind(slide.id)
    .execute(pool)
    .await
    .context("Failed to update carousel slide")?;

    get_by_id_mysql(pool, slide.id).await
}

async fn ordered_ids_mysql(conn: &mut sqlx::MySqlConnection) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT id FROM carousel_slides ORDER BY sort_order, id FOR UPDATE")
        .fetch_all(&mut *conn)
        .await
        .context("Failed to read carousel order")?;
    rows.iter()
        .map(|r| r.try_get::<i64, _>("id").map_err(Into::into))
        .collect()
}

async fn write_order_mysql(conn: &mut sqlx::MySqlConnection, plan: &[(i64, i32)]) -> Result<()> {
    for (id, order) in plan {
        sqlx::query("UPDATE carousel_slides SET sort_order = ? WHERE id = ?")
            .bind(order)
            .bind(id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to move carousel slide {}", id))?;
    }
    Ok(())
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM carousel_slides WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete carousel slide")?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    let remaining = ordered_ids_mysql(&mut tx).await?;
    let plan = plan_order(&remaining, &[]).unwrap_or_default();
    write_order_mysql(&mut tx, &plan).await?;
    tx.commit().await?;
    Ok(true)
}

async fn reorder_mysql(pool: &MySqlPool, ids: &[i64]) -> Result<ReorderOutcome> {
    let mut tx = pool.begin().await?;
    let current = ordered_ids_mysql(&mut tx).await?;
    let plan = match plan_order(&current, ids) {
        Ok(plan) => plan,
        Err(unknown) => return Ok(ReorderOutcome::UnknownIds(unknown)),
    };
    write_order_mysql(&mut tx, &plan).await?;
    tx.commit().await.context("Failed to commit carousel reorder")?;
    Ok(ReorderOutcome::Applied)
}

fn row_to_slide_mysql(row: &sqlx::mysql::MySqlRow) -> Result<CarouselSlide> {
    Ok(CarouselSlide {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        link: row.try_get("link")?,
        sort_order: row.try_get("sort_order")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
