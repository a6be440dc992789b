use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use crate::{
    catalog::{
        CatalogProvider, tier_file_name,
        error::{CatalogError, CatalogResult},
        models::parse_catalog,
    },
    state::game::{Difficulty, Song},
};

/// Catalog fetching `songs-<tier>.json` documents from a static file server.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Arc<str>,
}

impl HttpCatalog {
    /// Serve tiers published under `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    fn url_for(&self, difficulty: Difficulty) -> String {
        format!("{}/{}", self.base_url, tier_file_name(difficulty))
    }
}

impl CatalogProvider for HttpCatalog {
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>> {
        let client = self.client.clone();
        let url = self.url_for(difficulty);
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| CatalogError::Request {
                    url: url.clone(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(CatalogError::Status {
                    url,
                    status: response.status(),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|source| CatalogError::Request {
                    url: url.clone(),
                    source,
                })?;

            let songs = parse_catalog(&body, &url)?;
            debug!(%url, count = songs.len(), "fetched catalog");
            Ok(songs)
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve only the easy tier; every other tier answers 404.
    async fn serve_easy_tier() -> String {
        let app = Router::new().route(
            "/songs/songs-easy.json",
            get(|| async {
                r#"[
                    {"artist": "Queen", "track": "Under Pressure", "year": 1981},
                    {"artist": "Blur", "track": "Song 2", "year": 1997, "spotify_track_id": "1FTSo4v6BOZH9QxKc3MbVM"}
                ]"#
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/songs")
    }

    #[tokio::test]
    async fn fetches_and_parses_a_tier() {
        let catalog = HttpCatalog::new(&serve_easy_tier().await);

        let songs = catalog.fetch(Difficulty::Easy).await.unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, "Queen - Under Pressure");
        assert_eq!(songs[0].year, 1981);
        assert_eq!(songs[1].id, "1FTSo4v6BOZH9QxKc3MbVM");
        assert_eq!(
            songs[1].media_ref.track_id.as_deref(),
            Some("1FTSo4v6BOZH9QxKc3MbVM")
        );
    }

    #[tokio::test]
    async fn missing_tier_reports_the_status() {
        let base_url = serve_easy_tier().await;
        let catalog = HttpCatalog::new(&base_url);

        let err = catalog.fetch(Difficulty::Hard).await.unwrap_err();
        match err {
            CatalogError::Status { url, status } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(url, format!("{base_url}/songs-hard.json"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[test]
    fn builds_tier_urls() {
        let catalog = HttpCatalog::new("http://localhost:9000/songs/");
        assert_eq!(
            catalog.url_for(Difficulty::Easy),
            "http://localhost:9000/songs/songs-easy.json"
        );
    }
}
