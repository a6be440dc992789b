//! Preview playback providers. The engine never talks to them; the service layer
//! starts and stops previews around draws and placements.

mod embed;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use utoipa::ToSchema;

use crate::state::game::MediaRef;

pub use self::embed::{EmbedPlayback, SEARCH_EMBED_BASE, TRACK_EMBED_BASE};

/// Highest accepted volume.
pub const MAX_VOLUME: u8 = 100;

/// Failures reported by a playback provider. They never affect match state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The provider cannot turn this reference into a playable preview.
    #[error("no preview available for `{0}`")]
    Unresolvable(String),
    /// The operation needs a loaded preview.
    #[error("no preview is loaded")]
    NothingLoaded,
    /// The provider does not support this control.
    #[error("{0} is not supported by the {1} provider")]
    Unsupported(&'static str, EmbedKind),
    /// Volume outside `0..=100`.
    #[error("volume {0} is out of range (0-100)")]
    InvalidVolume(u8),
}

/// Available embed strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmbedKind {
    /// Direct track embed keyed by a streaming-service track id.
    TrackEmbed,
    /// Video embed resolved from a free-text search query.
    SearchEmbed,
}

impl std::fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedKind::TrackEmbed => f.write_str("track embed"),
            EmbedKind::SearchEmbed => f.write_str("search embed"),
        }
    }
}

/// Whether a preview is currently audible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

/// What the presentation layer should embed to play the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EmbedTarget {
    pub kind: EmbedKind,
    /// Track id or search query the embed is built from.
    pub reference: String,
    /// Ready-to-use embed URL.
    pub url: String,
}

/// Snapshot of the provider, polled or received through [`PlaybackProvider::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlaybackStatus {
    pub state: PlayerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EmbedTarget>,
    pub volume: u8,
    /// Seconds after which the presentation layer should cut the preview.
    pub preview_length_secs: u32,
}

/// Contract every preview player satisfies.
pub trait PlaybackProvider: Send + Sync {
    /// Load and start the preview for `media`.
    fn start(&self, media: &MediaRef) -> Result<(), PlaybackError>;
    /// Unload whatever is playing. Never fails.
    fn stop(&self);
    fn pause(&self) -> Result<(), PlaybackError>;
    fn resume(&self) -> Result<(), PlaybackError>;
    fn set_volume(&self, volume: u8) -> Result<(), PlaybackError>;
    /// Current status, for polling readers.
    fn state(&self) -> PlaybackStatus;
    /// Receive every status change from now on.
    fn subscribe(&self) -> watch::Receiver<PlaybackStatus>;
}
