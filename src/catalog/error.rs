//! Error types shared by the catalog providers.

use std::time::Duration;

use thiserror::Error;

use crate::state::game::Difficulty;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures raised while fetching or decoding a song catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The provider holds nothing for the requested tier.
    #[error("no catalog available for `{0}` difficulty")]
    MissingTier(Difficulty),
    /// Reading a catalog file from disk failed.
    #[error("failed to read catalog file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Catalog payload is not a JSON array of song records.
    #[error("failed to parse catalog `{origin}`")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    /// A song record is missing mandatory data.
    #[error("malformed song #{index} in catalog `{origin}`: {reason}")]
    Malformed {
        origin: String,
        index: usize,
        reason: &'static str,
    },
    /// Not enough songs for one anchor per team plus one draw.
    #[error("catalog for `{difficulty}` holds {available} songs but {needed} are required")]
    TooSmall {
        difficulty: Difficulty,
        available: usize,
        needed: usize,
    },
    /// The caller-imposed fetch deadline elapsed.
    #[error("catalog fetch timed out after {0:?}")]
    Timeout(Duration),
    /// The catalog request could not be sent.
    #[cfg(feature = "http-catalog")]
    #[error("failed to request catalog `{url}`")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog server answered with a non-success status.
    #[cfg(feature = "http-catalog")]
    #[error("unexpected catalog response status {status} for `{url}`")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}
