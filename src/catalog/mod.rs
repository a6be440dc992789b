//! Song catalog providers feeding the engine one difficulty tier at a time.

mod error;
mod file;
#[cfg(feature = "http-catalog")]
mod http;
mod models;

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;

use crate::state::game::{Difficulty, Song};

pub use self::error::{CatalogError, CatalogResult};
pub use self::file::FileCatalog;
#[cfg(feature = "http-catalog")]
pub use self::http::HttpCatalog;
pub use self::models::{RawSong, parse_catalog};

/// Abstraction over wherever the song lists live.
pub trait CatalogProvider: Send + Sync {
    /// Fetch every song of the given tier, in no particular order.
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>>;
}

/// File name holding the songs of a tier, shared by file and HTTP catalogs.
pub fn tier_file_name(difficulty: Difficulty) -> String {
    format!("songs-{}.json", difficulty.as_str())
}

/// In-memory catalog, handy for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tiers: Arc<HashMap<Difficulty, Vec<Song>>>,
}

impl StaticCatalog {
    /// Serve the same songs for every tier.
    pub fn uniform(songs: Vec<Song>) -> Self {
        let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .map(|difficulty| (difficulty, songs.clone()))
            .collect();
        Self {
            tiers: Arc::new(tiers),
        }
    }

    /// Serve explicit per-tier song lists; missing tiers fail to fetch.
    pub fn with_tiers(tiers: HashMap<Difficulty, Vec<Song>>) -> Self {
        Self {
            tiers: Arc::new(tiers),
        }
    }
}

impl CatalogProvider for StaticCatalog {
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>> {
        let tiers = Arc::clone(&self.tiers);
        Box::pin(async move {
            tiers
                .get(&difficulty)
                .cloned()
                .ok_or(CatalogError::MissingTier(difficulty))
        })
    }
}
