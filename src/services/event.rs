//! Event schedule service

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;

use super::{cache_get, cache_set, invalidate, ServiceError, ServiceResult};
use crate::cache::Cache;
use crate::db::repositories::EventRepository;
use crate::listing::EventFilter;
use crate::models::{Event, EventInput};

const CACHE_KEY_ALL: &str = "events:all";
const CACHE_KEY_BY_ID: &str = "events:id:";
const CACHE_PATTERN: &str = "events:*";

pub struct EventService {
    repo: Arc<dyn EventRepository>,
    cache: Arc<Cache>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Evento {} não encontrado", id))
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    /// Full schedule in chronological order
    pub async fn list(&self) -> ServiceResult<Vec<Event>> {
        if let Some(list) = cache_get(&self.cache, CACHE_KEY_ALL).await {
            return Ok(list);
        }
        let generation = self.cache.generation();
        let list = self.repo.list().await.context("Failed to list events")?;
        cache_set(&self.cache, CACHE_KEY_ALL, &list, generation).await;
        Ok(list)
    }

    pub async fn search(
        &self,
        filter: &EventFilter,
        favorites: &HashSet<i64>,
    ) -> ServiceResult<Vec<Event>> {
        let all = self.list().await?;
        Ok(filter.apply(&all, favorites))
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Event> {
        let key = format!("{}{}", CACHE_KEY_BY_ID, id);
        if let Some(event) = cache_get(&self.cache, &key).await {
            return Ok(event);
        }
        let generation = self.cache.generation();
        let event = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get event")?
            .ok_or_else(|| not_found(id))?;
        cache_set(&self.cache, &key, &event, generation).await;
        Ok(event)
    }

    pub async fn create(&self, input: EventInput) -> ServiceResult<Event> {
        let event = Event::from_valid(input.validate()?);
        let created = self.repo.create(&event).await?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Created event {} on {}", created.id, created.date);
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: EventInput) -> ServiceResult<Event> {
        let valid = input.validate()?;
        let mut event = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get event")?
            .ok_or_else(|| not_found(id))?;
        event.apply(valid);

        let updated = self.repo.update(&event).await?.ok_or_else(|| not_found(id))?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Deleted event {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxEventRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::listing::EventSortKey;

    async fn setup_service() -> EventService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        EventService::new(
            SqlxEventRepository::boxed(pool),
            create_cache(&CacheConfig::default()),
        )
    }

    fn input(title: &str, date: &str, start: &str, end: &str) -> EventInput {
        EventInput {
            title: title.to_string(),
            description: "Programação oficial da feira".to_string(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            location: "Arena".to_string(),
            event_type: "palestra".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_is_chronological() {
        let service = setup_service().await;
        service
            .create(input("Encerramento", "2026-05-06", "18:00", "20:00"))
            .await
            .unwrap();
        service
            .create(input("Abertura", "2026-05-04", "09:00", "10:00"))
            .await
            .unwrap();

        let titles: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Abertura", "Encerramento"]);
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() {
        let service = setup_service().await;
        let err = service
            .create(input("Abertura", "2026-05-04", "10:00", "09:00"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(errors) => assert!(errors.get("end_time").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = setup_service().await;
        let created = service
            .create(input("Abertura", "2026-05-04", "09:00", "10:00"))
            .await
            .unwrap();
        service.get(created.id).await.unwrap();

        let updated = service
            .update(created.id, input("Abertura Oficial", "2026-05-04", "09:30", "10:30"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Abertura Oficial");
        assert_eq!(service.get(created.id).await.unwrap().title, "Abertura Oficial");

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.get(created.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_sorts_by_title_desc() {
        let service = setup_service().await;
        service.create(input("Bovinos", "2026-05-04", "09:00", "10:00")).await.unwrap();
        service.create(input("Aves", "2026-05-05", "09:00", "10:00")).await.unwrap();

        let filter = EventFilter {
            sort_by: EventSortKey::Title,
            direction: crate::listing::SortDirection::Desc,
            ..Default::default()
        };
        let found = service.search(&filter, &HashSet::new()).await.unwrap();
        assert_eq!(found[0].title, "Bovinos");
        assert_eq!(found[1].title, "Aves");
    }
}
