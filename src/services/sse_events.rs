use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    dto::{
        game::{MatchSummary, PlacementResponse},
        sse::{PlacementEvent, ServerEvent, SongDrawnEvent, TurnAdvancedEvent},
    },
    playback::PlaybackStatus,
    state::{SharedState, game::Song},
};

const EVENT_MATCH_SNAPSHOT: &str = "match.snapshot";
const EVENT_SONG_DRAWN: &str = "song.drawn";
const EVENT_PLACEMENT_RESULT: &str = "placement.result";
const EVENT_TURN_ADVANCED: &str = "turn.advanced";
const EVENT_MATCH_RESET: &str = "match.reset";
const EVENT_PLAYBACK_STATE: &str = "playback.state";

/// Broadcast the whole match as seen by players.
pub fn broadcast_match_snapshot(state: &SharedState, summary: &MatchSummary) {
    send_public_event(state, EVENT_MATCH_SNAPSHOT, summary);
}

/// Broadcast that a song was drawn, without revealing its year or title.
pub fn broadcast_song_drawn(state: &SharedState, active_team_index: usize, song: &Song) {
    let payload = SongDrawnEvent {
        active_team_index,
        song: song.clone().into(),
    };
    send_public_event(state, EVENT_SONG_DRAWN, &payload);
}

/// Broadcast the outcome of a placement, revealing the song.
pub fn broadcast_placement(state: &SharedState, team_index: usize, placement: &PlacementResponse) {
    let payload = PlacementEvent {
        team_index,
        correct: placement.correct,
        victory: placement.victory,
        song: placement.song.clone(),
    };
    send_public_event(state, EVENT_PLACEMENT_RESULT, &payload);
}

pub fn broadcast_turn_advanced(state: &SharedState, active_team_index: usize) {
    send_public_event(
        state,
        EVENT_TURN_ADVANCED,
        &TurnAdvancedEvent { active_team_index },
    );
}

/// Broadcast that the match was dropped; carries the empty setup snapshot.
pub fn broadcast_match_reset(state: &SharedState, summary: &MatchSummary) {
    send_public_event(state, EVENT_MATCH_RESET, summary);
}

pub fn broadcast_playback_state(state: &SharedState, status: &PlaybackStatus) {
    send_public_event(state, EVENT_PLAYBACK_STATE, status);
}

/// Relay every player state change onto the public stream until the player goes away.
pub fn spawn_playback_forwarder(state: SharedState) -> JoinHandle<()> {
    let mut receiver = state.playback().subscribe();
    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let status = receiver.borrow_and_update().clone();
            broadcast_playback_state(&state, &status);
        }
        debug!("playback forwarder stopped");
    })
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
