//! Exhibitor service

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;

use super::{cache_get, cache_set, invalidate, ServiceError, ServiceResult};
use crate::cache::Cache;
use crate::db::repositories::ExhibitorRepository;
use crate::listing::ExhibitorFilter;
use crate::models::{Exhibitor, ExhibitorInput};

const CACHE_KEY_ALL: &str = "exhibitors:all";
const CACHE_KEY_BY_ID: &str = "exhibitors:id:";
const CACHE_PATTERN: &str = "exhibitors:*";

pub struct ExhibitorService {
    repo: Arc<dyn ExhibitorRepository>,
    cache: Arc<Cache>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Expositor {} não encontrado", id))
}

impl ExhibitorService {
    pub fn new(repo: Arc<dyn ExhibitorRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Exhibitor>> {
        if let Some(list) = cache_get(&self.cache, CACHE_KEY_ALL).await {
            return Ok(list);
        }
        let generation = self.cache.generation();
        let list = self.repo.list().await.context("Failed to list exhibitors")?;
        cache_set(&self.cache, CACHE_KEY_ALL, &list, generation).await;
        Ok(list)
    }

    /// The directory as a visitor sees it: filtered, searched and sorted
    pub async fn search(
        &self,
        filter: &ExhibitorFilter,
        favorites: &HashSet<i64>,
    ) -> ServiceResult<Vec<Exhibitor>> {
        let all = self.list().await?;
        Ok(filter.apply(&all, favorites))
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Exhibitor> {
        let key = format!("{}{}", CACHE_KEY_BY_ID, id);
        if let Some(exhibitor) = cache_get(&self.cache, &key).await {
            return Ok(exhibitor);
        }
        let generation = self.cache.generation();
        let exhibitor = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get exhibitor")?
            .ok_or_else(|| not_found(id))?;
        cache_set(&self.cache, &key, &exhibitor, generation).await;
        Ok(exhibitor)
    }

    pub async fn create(&self, input: ExhibitorInput) -> ServiceResult<Exhibitor> {
        input.validate()?;
        let mut exhibitor = Exhibitor::new(String::new(), String::new());
        exhibitor.apply(input);

        let created = self.repo.create(&exhibitor).await?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Created exhibitor {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: ExhibitorInput) -> ServiceResult<Exhibitor> {
        input.validate()?;
        let mut exhibitor = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get exhibitor")?
            .ok_or_else(|| not_found(id))?;
        exhibitor.apply(input);

        let updated = self.repo.update(&exhibitor).await?.ok_or_else(|| not_found(id))?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Deleted exhibitor {}", id);
        Ok(())
    }
}
