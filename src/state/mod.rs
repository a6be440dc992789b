pub mod engine;
pub mod game;
pub mod shuffle;
mod sse;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    catalog::CatalogProvider,
    config::AppConfig,
    playback::PlaybackProvider,
    state::{engine::GameEngine, game::MatchSnapshot},
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 32;

/// Central application state: the single match engine, the preview player and
/// the public event stream.
pub struct AppState {
    config: AppConfig,
    engine: Mutex<GameEngine>,
    playback: Arc<dyn PlaybackProvider>,
    sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn CatalogProvider>,
        playback: Arc<dyn PlaybackProvider>,
    ) -> SharedState {
        Self::with_engine(config, GameEngine::new(catalog), playback)
    }

    /// Same as [`AppState::new`] with a pre-built engine (custom song order in tests).
    pub fn with_engine(
        config: AppConfig,
        engine: GameEngine,
        playback: Arc<dyn PlaybackProvider>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            engine: Mutex::new(engine),
            playback,
            sse: SseHub::new(SSE_CAPACITY),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The match engine. Holding the guard serializes every engine operation.
    pub fn engine(&self) -> &Mutex<GameEngine> {
        &self.engine
    }

    /// Preview player wired into this instance.
    pub fn playback(&self) -> &dyn PlaybackProvider {
        self.playback.as_ref()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Owned snapshot of the current match.
    pub async fn snapshot(&self) -> MatchSnapshot {
        self.engine.lock().await.snapshot()
    }
}
