//! Persistence backends for the favorites store

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::Favorite;

#[async_trait]
pub trait FavoritesBackend: Send + Sync {
    async fn load(&self) -> Result<Vec<Favorite>>;
    async fn save(&self, favorites: &[Favorite]) -> Result<()>;
}

/// Keeps the last saved list in memory; used in tests and for throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Vec<Favorite>>,
}

impl MemoryBackend {
    pub fn with_items(items: Vec<Favorite>) -> Self {
        Self {
            saved: Mutex::new(items),
        }
    }
}

#[async_trait]
impl FavoritesBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<Favorite>> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites lock poisoned"))?;
        Ok(saved.clone())
    }

    async fn save(&self, favorites: &[Favorite]) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites lock poisoned"))?;
        *saved = favorites.to_vec();
        Ok(())
    }
}

/// JSON file on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl FavoritesBackend for FileBackend {
    async fn load(&self) -> Result<Vec<Favorite>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable favorites file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, favorites: &[Favorite]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_vec_pretty(favorites)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
