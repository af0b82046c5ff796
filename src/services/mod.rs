//! Services layer
//!
//! Services sit between the HTTP handlers and the repositories: they
//! validate admin input, serve reads from the cache when possible and drop
//! the affected cache keys after every write. A cache failure is logged and
//! otherwise ignored; it never fails the request.

pub mod carousel;
pub mod event;
pub mod exhibitor;
pub mod notification;
pub mod settings;

pub use carousel::CarouselService;
pub use event::EventService;
pub use exhibitor::ExhibitorService;
pub use notification::NotificationService;
pub use settings::{SettingsService, SiteSettings, SiteSettingsInput};

use serde::{de::DeserializeOwned, Serialize};

use crate::cache::{Cache, CacheLayer};
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Message is user-facing
    #[error("{0}")]
    NotFound(String),

    #[error("Dados inválidos: {0}")]
    Validation(ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

async fn cache_get<T: DeserializeOwned + Send>(cache: &Cache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

/// Cache a value loaded after `generation` was read. Nothing is kept if an
/// invalidation ran in the meantime, since the value may predate that write.
async fn cache_set<T: Serialize + Send + Sync>(
    cache: &Cache,
    key: &str,
    value: &T,
    generation: u64,
) {
    if cache.generation() != generation {
        return;
    }
    if let Err(e) = cache.set(key, value, cache.default_ttl()).await {
        tracing::warn!("Cache write failed for {}: {}", key, e);
        return;
    }
    // An invalidation may have landed between the check and the write
    if cache.generation() != generation {
        if let Err(e) = cache.delete(key).await {
            tracing::warn!("Cache delete failed for {}: {}", key, e);
        }
    }
}

async fn invalidate(cache: &Cache, pattern: &str) {
    if let Err(e) = cache.delete_pattern(pattern).await {
        tracing::warn!("Cache invalidation failed for {}: {}", pattern, e);
    }
}
