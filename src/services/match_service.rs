//! Business logic behind the match routes. Every operation takes the engine lock
//! for its whole duration, so engine calls never interleave.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    catalog::CatalogError,
    dto::game::{
        DrawResponse, MatchSummary, PlaceSongRequest, PlacementResponse, StartMatchRequest,
        TeamSummary, TurnResponse,
    },
    error::ServiceError,
    services::sse_events,
    state::{SharedState, engine::GameEngine, game::MatchSettings},
};

/// Snapshot of the match currently held by the engine.
pub async fn current_match(state: &SharedState) -> MatchSummary {
    state.snapshot().await.into()
}

/// Start a new match. Fails with a conflict while another match is in progress.
pub async fn start_match(
    state: &SharedState,
    request: StartMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    let config = state.config();
    let win_target = request.win_target.unwrap_or(config.default_win_count);
    if !config.win_count_in_range(win_target) {
        return Err(ServiceError::InvalidInput(format!(
            "win target must be between {} and {} (got {win_target})",
            config.min_win_count, config.max_win_count
        )));
    }

    let settings = MatchSettings {
        team_names: request.team_names,
        difficulty: request.difficulty,
        win_target,
    };

    let summary = {
        let mut engine = state.engine().lock().await;
        initialize_with_deadline(&mut engine, settings, config.catalog_timeout).await?;
        MatchSummary::from(engine.snapshot())
    };

    sse_events::broadcast_match_snapshot(state, &summary);
    Ok(summary)
}

/// Draw the next song for the active team and start its preview.
///
/// A preview that fails to start does not undo the draw; the failure is
/// reported alongside the song.
pub async fn draw_song(state: &SharedState) -> Result<DrawResponse, ServiceError> {
    let (song, active_team_index, playback_error) = {
        let mut engine = state.engine().lock().await;
        let song = engine.draw_next_song()?;
        // Started under the lock so a concurrent place or reset cannot stop it first.
        let playback_error = match state.playback().start(&song.media_ref) {
            Ok(()) => None,
            Err(err) => {
                warn!(song_id = %song.id, error = %err, "preview could not be started");
                Some(err.to_string())
            }
        };
        (song, engine.state().active_team_index, playback_error)
    };

    sse_events::broadcast_song_drawn(state, active_team_index, &song);

    Ok(DrawResponse {
        song: song.into(),
        active_team_index,
        playback: state.playback().state(),
        playback_error,
    })
}

/// Place the pending song into a team's timeline and stop the preview.
pub async fn place_song(
    state: &SharedState,
    request: PlaceSongRequest,
) -> Result<PlacementResponse, ServiceError> {
    let (response, summary) = {
        let mut engine = state.engine().lock().await;
        let pending = engine.pending_song().cloned();
        let result = engine.place_song(request.team_index, request.insert_index)?;

        let song = pending.ok_or_else(|| {
            ServiceError::InvalidState("placement succeeded without a pending song".into())
        })?;
        let team = engine
            .state()
            .teams
            .get(request.team_index)
            .cloned()
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "team {} vanished during placement",
                    request.team_index
                ))
            })?;

        let response =
            PlacementResponse::new(result, song, TeamSummary::from((request.team_index, team)));
        state.playback().stop();
        (response, MatchSummary::from(engine.snapshot()))
    };

    sse_events::broadcast_placement(state, request.team_index, &response);
    sse_events::broadcast_match_snapshot(state, &summary);
    Ok(response)
}

/// Pass the turn to the next team.
pub async fn advance_turn(state: &SharedState) -> Result<TurnResponse, ServiceError> {
    let response = {
        let mut engine = state.engine().lock().await;
        let active_team_index = engine.advance_turn()?;
        let active_team = engine
            .active_team()
            .map(|team| team.name.clone())
            .unwrap_or_default();
        TurnResponse {
            active_team_index,
            active_team,
        }
    };

    sse_events::broadcast_turn_advanced(state, response.active_team_index);
    Ok(response)
}

/// Drop the current match, whatever its phase, and silence the preview.
pub async fn reset_match(state: &SharedState) -> MatchSummary {
    let summary = {
        let mut engine = state.engine().lock().await;
        engine.reset();
        state.playback().stop();
        MatchSummary::from(engine.snapshot())
    };

    sse_events::broadcast_match_reset(state, &summary);
    summary
}

/// Start a fresh match with the settings of the current (or finished) one.
///
/// The old match is dropped before the catalog is fetched again, so a failed
/// replay leaves the engine in setup and subscribers receive `match.reset`.
pub async fn replay_match(state: &SharedState) -> Result<MatchSummary, ServiceError> {
    let (outcome, summary) = {
        let mut engine = state.engine().lock().await;
        let settings = engine
            .settings()
            .cloned()
            .ok_or_else(|| ServiceError::InvalidState("no match to replay".into()))?;

        engine.reset();
        state.playback().stop();
        info!(difficulty = %settings.difficulty, "replaying match");

        let outcome =
            initialize_with_deadline(&mut engine, settings, state.config().catalog_timeout).await;
        (outcome, MatchSummary::from(engine.snapshot()))
    };

    match outcome {
        Ok(()) => {
            sse_events::broadcast_match_snapshot(state, &summary);
            Ok(summary)
        }
        Err(err) => {
            warn!(error = %err, "replay failed; match dropped");
            sse_events::broadcast_match_reset(state, &summary);
            Err(err)
        }
    }
}

/// Run [`GameEngine::initialize`] bounded by `deadline`.
///
/// A timed-out initialization is dropped before it swaps any state in, so the
/// engine stays in setup.
async fn initialize_with_deadline(
    engine: &mut GameEngine,
    settings: MatchSettings,
    deadline: Duration,
) -> Result<(), ServiceError> {
    let MatchSettings {
        team_names,
        difficulty,
        win_target,
    } = settings;

    match timeout(deadline, engine.initialize(team_names, difficulty, win_target)).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!(%difficulty, ?deadline, "song catalog fetch timed out");
            Err(ServiceError::Catalog(CatalogError::Timeout(deadline)))
        }
    }
}
