//! Hitster Back binary entrypoint wiring the song catalog, preview player, REST and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hitster_back::{
    build_router,
    catalog::{CatalogProvider, FileCatalog},
    config::AppConfig,
    playback::EmbedPlayback,
    services::sse_events,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let catalog = build_catalog(&config);
    let playback = Arc::new(EmbedPlayback::new(
        config.playback,
        config.default_volume,
        config.preview_length_secs,
    ));

    let app_state = AppState::new(config, catalog, playback);
    sse_events::spawn_playback_forwarder(app_state.clone());

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the catalog source: remote tier files when a URL is configured, local files otherwise.
fn build_catalog(config: &AppConfig) -> Arc<dyn CatalogProvider> {
    if let Some(remote) = remote_catalog(config) {
        return remote;
    }

    info!(dir = %config.catalog_dir.display(), "serving songs from local catalog");
    Arc::new(FileCatalog::new(config.catalog_dir.clone()))
}

#[cfg(feature = "http-catalog")]
fn remote_catalog(config: &AppConfig) -> Option<Arc<dyn CatalogProvider>> {
    let url = config.catalog_url.as_deref()?;
    info!(%url, "serving songs from remote catalog");
    Some(Arc::new(hitster_back::catalog::HttpCatalog::new(url)))
}

#[cfg(not(feature = "http-catalog"))]
fn remote_catalog(config: &AppConfig) -> Option<Arc<dyn CatalogProvider>> {
    if config.catalog_url.is_some() {
        warn!("catalog_url is set but the http-catalog feature is disabled; using local files");
    }
    None
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
