//! Homepage carousel service

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;

use super::{cache_get, cache_set, invalidate, ServiceError, ServiceResult};
use crate::cache::Cache;
use crate::db::repositories::{CarouselRepository, ReorderOutcome};
use crate::models::{CarouselSlide, CreateSlideInput, UpdateSlideInput};
use crate::validation::ValidationErrors;

const CACHE_KEY_ALL: &str = "carousel:all";
const CACHE_KEY_ACTIVE: &str = "carousel:active";
const CACHE_PATTERN: &str = "carousel:*";

pub struct CarouselService {
    repo: Arc<dyn CarouselRepository>,
    cache: Arc<Cache>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Slide {} não encontrado", id))
}

fn invalid_ids(message: String) -> ServiceError {
    let mut errors = ValidationErrors::new();
    errors.add("ids", message);
    ServiceError::Validation(errors)
}

impl CarouselService {
    pub fn new(repo: Arc<dyn CarouselRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    /// Slides in display order
    pub async fn list(&self, active_only: bool) -> ServiceResult<Vec<CarouselSlide>> {
        let key = if active_only { CACHE_KEY_ACTIVE } else { CACHE_KEY_ALL };
        if let Some(list) = cache_get(&self.cache, key).await {
            return Ok(list);
        }
        let generation = self.cache.generation();
        let list = self
            .repo
            .list(active_only)
            .await
            .context("Failed to list carousel slides")?;
        cache_set(&self.cache, key, &list, generation).await;
        Ok(list)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<CarouselSlide> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get carousel slide")?
            .ok_or_else(|| not_found(id))
    }

    /// New slides go to the end of the rotation
    pub async fn create(&self, input: CreateSlideInput) -> ServiceResult<CarouselSlide> {
        let slide = input.validate()?;
        let created = self.repo.create(&slide).await?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Created carousel slide {} at position {}", created.id, created.sort_order);
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: UpdateSlideInput) -> ServiceResult<CarouselSlide> {
        input.validate()?;
        let mut slide = self.get(id).await?;
        input.apply_to(&mut slide);

        let updated = self.repo.update(&slide).await?.ok_or_else(|| not_found(id))?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        invalidate(&self.cache, CACHE_PATTERN).await;
        Ok(())
    }

    /// Give the listed slides positions 1..n in the order given.
    ///
    /// The batch is all or nothing: a duplicate or unknown id rejects the
    /// whole request and leaves the stored order untouched.
    pub async fn reorder(&self, ids: &[i64]) -> ServiceResult<Vec<CarouselSlide>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let duplicates: Vec<String> = ids
            .iter()
            .filter(|id| !seen.insert(**id))
            .map(|id| id.to_string())
            .collect();
        if !duplicates.is_empty() {
            return Err(invalid_ids(format!(
                "IDs repetidos: {}",
                duplicates.join(", ")
            )));
        }

        match self.repo.reorder(ids).await? {
            ReorderOutcome::Applied => {}
            ReorderOutcome::UnknownIds(unknown) => {
                let unknown: Vec<String> = unknown.iter().map(|id| id.to_string()).collect();
                return Err(invalid_ids(format!(
                    "Slides não encontrados: {}",
                    unknown.join(", ")
                )));
            }
        }

        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Reordered {} carousel slides", ids.len());
        self.list(false).await
    }
}
