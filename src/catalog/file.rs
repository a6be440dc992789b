use std::path::PathBuf;

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    catalog::{
        CatalogProvider, tier_file_name,
        error::{CatalogError, CatalogResult},
        models::parse_catalog,
    },
    state::game::{Difficulty, Song},
};

/// Catalog reading one `songs-<tier>.json` file per difficulty from a directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    /// Serve tiers stored under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the file backing a tier.
    pub fn path_for(&self, difficulty: Difficulty) -> PathBuf {
        self.dir.join(tier_file_name(difficulty))
    }
}

impl CatalogProvider for FileCatalog {
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>> {
        let path = self.path_for(difficulty);
        Box::pin(async move {
            let origin = path.display().to_string();
            let contents =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| CatalogError::Read {
                        path: origin.clone(),
                        source,
                    })?;

            let songs = parse_catalog(&contents, &origin)?;
            debug!(path = %origin, count = songs.len(), "loaded catalog file");
            Ok(songs)
        })
    }
}
