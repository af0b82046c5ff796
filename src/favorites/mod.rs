//! Visitor favorites
//!
//! Favorites are personal bookmarks and never touch the server database.
//! [`FavoritesStore`] keeps them in memory, persists every change through a
//! [`FavoritesBackend`] and broadcasts [`FavoriteChange`]s to subscribers.
//! The listing filters take the ids returned by [`FavoritesStore::ids`].

mod backend;

pub use backend::{FavoritesBackend, FileBackend, MemoryBackend};

use std::collections::HashSet;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::models::{Favorite, FavoriteKind};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteChange {
    Added(Favorite),
    Removed { id: i64, kind: FavoriteKind },
}

pub struct FavoritesStore<B: FavoritesBackend> {
    backend: B,
    items: Vec<Favorite>,
    changes: broadcast::Sender<FavoriteChange>,
}

impl<B: FavoritesBackend> FavoritesStore<B> {
    /// Load the persisted favorites from `backend`
    pub async fn open(backend: B) -> Result<Self> {
        let items = backend.load().await?;
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self {
            backend,
            items,
            changes,
        })
    }

    pub fn list(&self) -> &[Favorite] {
        &self.items
    }

    pub fn contains(&self, id: i64, kind: FavoriteKind) -> bool {
        self.items.iter().any(|f| f.id == id && f.kind == kind)
    }

    pub fn ids(&self, kind: FavoriteKind) -> HashSet<i64> {
        self.items
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.id)
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FavoriteChange> {
        self.changes.subscribe()
    }

    /// Returns `false` when the item was already a favorite
    pub async fn add(&mut self, id: i64, kind: FavoriteKind) -> Result<bool> {
        if self.contains(id, kind) {
            return Ok(false);
        }
        let favorite = Favorite::new(id, kind);
        let mut next = self.items.clone();
        next.push(favorite.clone());
        self.commit(next).await?;
        self.notify(FavoriteChange::Added(favorite));
        Ok(true)
    }

    /// Returns `false` when the item was not a favorite
    pub async fn remove(&mut self, id: i64, kind: FavoriteKind) -> Result<bool> {
        if !self.contains(id, kind) {
            return Ok(false);
        }
        let next = self
            .items
            .iter()
            .filter(|f| !(f.id == id && f.kind == kind))
            .cloned()
            .collect();
        self.commit(next).await?;
        self.notify(FavoriteChange::Removed { id, kind });
        Ok(true)
    }

    /// Flip the favorite state; returns whether the item is now a favorite
    pub async fn toggle(&mut self, id: i64, kind: FavoriteKind) -> Result<bool> {
        if self.contains(id, kind) {
            self.remove(id, kind).await?;
            Ok(false)
        } else {
            self.add(id, kind).await?;
            Ok(true)
        }
    }

    /// The in-memory list only changes once the backend has accepted `next`
    async fn commit(&mut self, next: Vec<Favorite>) -> Result<()> {
        self.backend.save(&next).await?;
        self.items = next;
        Ok(())
    }

    fn notify(&self, change: FavoriteChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }
}
