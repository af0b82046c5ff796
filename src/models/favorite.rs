//! Favorite model: a visitor-local bookmark, never persisted server-side

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Exhibitor,
    Event,
}

impl std::fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhibitor => write!(f, "exhibitor"),
            Self::Event => write!(f, "event"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    pub timestamp: DateTime<Utc>,
}

impl Favorite {
    pub fn new(id: i64, kind: FavoriteKind) -> Self {
        Self {
            id,
            kind,
            timestamp: Utc::now(),
        }
    }
}
