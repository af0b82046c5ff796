//! Notification service
//!
//! Notifications are published by administrators and only ever change by
//! being marked as read or deleted.

use std::sync::Arc;

use anyhow::Context;

use super::{cache_get, cache_set, invalidate, ServiceError, ServiceResult};
use crate::cache::Cache;
use crate::db::repositories::NotificationRepository;
use crate::models::{Notification, NotificationInput};

const CACHE_KEY_ALL: &str = "notifications:all";
const CACHE_PATTERN: &str = "notifications:*";

pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    cache: Arc<Cache>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Notificação {} não encontrada", id))
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    /// Newest first
    pub async fn list(&self) -> ServiceResult<Vec<Notification>> {
        if let Some(list) = cache_get(&self.cache, CACHE_KEY_ALL).await {
            return Ok(list);
        }
        let generation = self.cache.generation();
        let list = self.repo.list().await.context("Failed to list notifications")?;
        cache_set(&self.cache, CACHE_KEY_ALL, &list, generation).await;
        Ok(list)
    }

    pub async fn unread_count(&self) -> ServiceResult<usize> {
        Ok(self.list().await?.iter().filter(|n| !n.read).count())
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Notification> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get notification")?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, input: NotificationInput) -> ServiceResult<Notification> {
        let notification = input.validate()?;
        let created = self.repo.create(&notification).await?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!(
            "Published {} notification {}: {}",
            created.notification_type,
            created.id,
            created.title
        );
        Ok(created)
    }

    /// Marking an already-read notification succeeds
    pub async fn mark_read(&self, id: i64) -> ServiceResult<Notification> {
        if !self.repo.mark_read(id).await? {
            return Err(not_found(id));
        }
        invalidate(&self.cache, CACHE_PATTERN).await;
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        invalidate(&self.cache, CACHE_PATTERN).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxNotificationRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::NotificationType;

    async fn setup_service() -> NotificationService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        NotificationService::new(
            SqlxNotificationRepository::boxed(pool),
            create_cache(&CacheConfig::default()),
        )
    }

    fn input(title: &str, kind: &str) -> NotificationInput {
        NotificationInput {
            title: title.to_string(),
            message: "Confira a programação atualizada".to_string(),
            notification_type: kind.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_mark_read() {
        let service = setup_service().await;
        let created = service.create(input("Mudança", "schedule-change")).await.unwrap();
        assert_eq!(created.notification_type, NotificationType::ScheduleChange);
        assert_eq!(service.unread_count().await.unwrap(), 1);

        let read = service.mark_read(created.id).await.unwrap();
        assert!(read.read);
        assert_eq!(service.unread_count().await.unwrap(), 0);

        // second call is a no-op, not an error
        assert!(service.mark_read(created.id).await.unwrap().read);
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected() {
        let service = setup_service().await;
        let err = service.create(input("Aviso", "alarme")).await.unwrap_err();
        match err {
            ServiceError::Validation(errors) => {
                assert_eq!(errors.get("type"), Some("Tipo de notificação inválido"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_notification() {
        let service = setup_service().await;
        assert!(matches!(service.mark_read(7).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(7).await, Err(ServiceError::NotFound(_))));
    }
}
