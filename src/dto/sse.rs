use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::game::{HiddenSongSummary, SongSummary};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Raw event with a preformatted data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the active team drew a song.
pub struct SongDrawnEvent {
    pub active_team_index: usize,
    pub song: HiddenSongSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after a placement, revealing the song.
pub struct PlacementEvent {
    pub team_index: usize,
    pub correct: bool,
    pub victory: bool,
    pub song: SongSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the turn moves to another team.
pub struct TurnAdvancedEvent {
    pub active_team_index: usize,
}
