//! Event repository
//!
//! Dates and times are stored as `YYYY-MM-DD` / `HH:MM` text and tags as a
//! JSON array, so both dialects share one column layout. Rows written by
//! other tools may not parse; those fall back to defaults with a warning
//! instead of failing the whole listing.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Event;
use crate::validation::{parse_date, parse_time};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str = "id, title, description, event_date, start_time, end_time, location, event_type, featured, tags, image, created_at, updated_at";

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;
    /// Every event in schedule order
    async fn list(&self) -> Result<Vec<Event>>;
    async fn update(&self, event: &Event) -> Result<Option<Event>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxEventRepository {
    pool: DynDatabasePool,
}

impl SqlxEventRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, event: &Event) -> Result<Event> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, event).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, event).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Event>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update(&self, event: &Event) -> Result<Option<Event>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.sqlite()?, event).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.mysql()?, event).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.mysql()?, id).await,
        }
    }
}

/// Text columns of an event row, before parsing
struct StoredSchedule {
    id: i64,
    date: String,
    start_time: String,
    end_time: String,
    tags: String,
}

impl StoredSchedule {
    fn date(&self) -> NaiveDate {
        parse_date(&self.date).unwrap_or_else(|| {
            tracing::warn!("Event {} has unreadable date {:?}", self.id, self.date);
            NaiveDate::default()
        })
    }

    fn time(&self, raw: &str) -> NaiveTime {
        parse_time(raw).unwrap_or_else(|| {
            tracing::warn!("Event {} has unreadable time {:?}", self.id, raw);
            NaiveTime::default()
        })
    }

    fn tags(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_else(|e| {
            tracing::warn!("Event {} has unreadable tags: {}", self.id, e);
            Vec::new()
        })
    }
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).context("Failed to encode event tags")
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    stored: StoredSchedule,
    title: String,
    description: String,
    location: String,
    event_type: String,
    featured: bool,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Event {
    Event {
        id: stored.id,
        date: stored.date(),
        start_time: stored.time(&stored.start_time),
        end_time: stored.time(&stored.end_time),
        tags: stored.tags(),
        title,
        description,
        location,
        event_type,
        featured,
        image,
        created_at,
        updated_at,
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, event: &Event) -> Result<Event> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO events (title, description, event_date, start_time, end_time, location, event_type, featured, tags, image, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date.format("%Y-%m-%d").to_string())
    .bind(event.start_time.format("%H:%M").to_string())
    .bind(event.end_time.format("%H:%M").to_string())
    .bind(&event.location)
    .bind(&event.event_type)
    .bind(event.featured)
    .bind(encode_tags(&event.tags)?)
    .bind(&event.image)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create event")?;

    Ok(Event {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..event.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Event>> {
    let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get event")?;
    row.map(|r| row_to_event_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Event>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM events ORDER BY event_date, start_time, id",
        COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list events")?;
    rows.iter().map(row_to_event_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, event: &Event) -> Result<Option<Event>> {
    let result = sqlx::query(
        "UPDATE events SET title = ?, description = ?, event_date = ?, start_time = ?, end_time = ?, location = ?, \
         event_type = ?, featured = ?, tags = ?, image = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date.format("%Y-%m-%d").to_string())
    .bind(event.start_time.format("%H:%M").to_string())
    .bind(event.end_time.format("%H:%M").to_string())
    .bind(&event.location)
    .bind(&event.event_type)
    .bind(event.featured)
    .bind(encode_tags(&event.tags)?)
    .bind(&event.image)
    .bind(Utc::now())
    .bind(event.id)
    .execute(pool)
    .await
    .context("Failed to update event")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id_sqlite(pool, event.id).await
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete event")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_event_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Event> {
    let stored = StoredSchedule {
        id: row.try_get("id")?,
        date: row.try_get("event_date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        tags: row.try_get("tags")?,
    };
    Ok(assemble(
        stored,
        row.try_get("title")?,
        row.try_get("description")?,
        row.try_get("location")?,
        row.try_get("event_type")?,
        row.try_get("featured")?,
        row.try_get("image")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
    ))
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, event: &Event) -> Result<Event> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO events (title, description, event_date, start_time, end_time, location, event_type, featured, tags, image, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date.format("%Y-%m-%d").to_string())
    .bind(event.start_time.format("%H:%M").to_string())
    .bind(event.end_time.format("%H:%M").to_string())
    .bind(&event.location)
    .bind(&event.event_type)
    .bind(event.featured)
    .bind(encode_tags(&event.tags)?)
    .bind(&event.image)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create event")?;

    Ok(Event {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..event.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Event>> {
    let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get event")?;
    row.map(|r| row_to_event_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Event>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM events ORDER BY event_date, start_time, id",
        COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list events")?;
    rows.iter().map(row_to_event_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, event: &Event) -> Result<Option<Event>> {
    sqlx::query(
        "UPDATE events SET title = ?, description = ?, event_date = ?, start_time = ?, end_time = ?, location = ?, \
         event_type = ?, featured = ?, tags = ?, image = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date.format("%Y-%m-%d").to_string())
    .bind(event.start_time.format("%H:%M").to_string())
    .bind(event.end_time.format("%H:%M").to_string())
    .bind(&event.location)
    .bind(&event.event_type)
    .bind(event.featured)
    .bind(encode_tags(&event.tags)?)
    .bind(&event.image)
    .bind(Utc::now())
    .bind(event.id)
    .execute(pool)
    .await
    .context("Failed to update event")?;

    get_by_id_mysql(pool, event.id).await
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete event")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_event_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Event> {
    let stored = StoredSchedule {
        id: row.try_get("id")?,
        date: row.try_get("event_date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        tags: row.try_get("tags")?,
    };
    Ok(assemble(
        stored,
        row.try_get("title")?,
        row.try_get("description")?,
        row.try_get("location")?,
        row.try_get("event_type")?,
        row.try_get("featured")?,
        row.try_get("image")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxEventRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxEventRepository::new(pool.clone());
        (pool, repo)
    }

    fn event(title: &str, day: u32, hour: u32) -> Event {
        let mut e = Event::new(
            title.to_string(),
            NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hour + 1, 30, 0).unwrap(),
        );
        e.description = "Programação oficial".to_string();
        e.event_type = "Palestra".to_string();
        e.tags = vec!["solo".to_string(), "soja".to_string()];
        e
    }

    #[tokio::test]
    async fn test_create_round_trips_schedule_and_tags() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(&event("Manejo do Solo", 4, 9)).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.date, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        assert_eq!(found.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(found.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(found.tags, vec!["solo", "soja"]);
    }

    #[tokio::test]
    async fn test_list_in_schedule_order() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&event("Tarde", 5, 14)).await.unwrap();
        repo.create(&event("Manhã", 5, 8)).await.unwrap();
        repo.create(&event("Véspera", 4, 20)).await.unwrap();

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Véspera", "Manhã", "Tarde"]);
    }

    #[tokio::test]
    async fn test_unreadable_columns_fall_back() {
        let (pool, repo) = setup_test_repo().await;
        sqlx::query(
            "INSERT INTO events (title, event_date, start_time, end_time, tags) VALUES ('Legado', '04/05', '9h', '', 'solo')",
        )
        .execute(pool.sqlite().unwrap())
        .await
        .unwrap();

        let events = repo.list().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_time, NaiveTime::default());
        assert!(events[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_pool, repo) = setup_test_repo().await;
        let mut created = repo.create(&event("Leilão", 6, 15)).await.unwrap();

        created.featured = true;
        created.tags.clear();
        let updated = repo.update(&created).await.unwrap().unwrap();
        assert!(updated.featured);
        assert!(updated.tags.is_empty());

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        created.id = 777;
        assert!(repo.update(&created).await.unwrap().is_none());
    }
}
