use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{
        DrawResponse, MatchSummary, PlaceSongRequest, PlacementResponse, StartMatchRequest,
        TurnResponse,
    },
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Routes driving the single match held by the engine.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/match", get(current_match).post(start_match))
        .route("/match/draw", post(draw_song))
        .route("/match/place", post(place_song))
        .route("/match/advance", post(advance_turn))
        .route("/match/reset", post(reset_match))
        .route("/match/replay", post(replay_match))
}

/// Return the current match as seen by players.
#[utoipa::path(
    get,
    path = "/match",
    tag = "match",
    responses((status = 200, description = "Current match", body = MatchSummary))
)]
pub async fn current_match(State(state): State<SharedState>) -> Json<MatchSummary> {
    Json(match_service::current_match(&state).await)
}

/// Start a match: fetch the catalog for the difficulty and anchor every team.
#[utoipa::path(
    post,
    path = "/match",
    tag = "match",
    request_body = StartMatchRequest,
    responses(
        (status = 200, description = "Match started", body = MatchSummary),
        (status = 400, description = "Invalid teams or win target"),
        (status = 409, description = "A match is already running or the catalog is too small"),
        (status = 503, description = "Song catalog unavailable")
    )
)]
pub async fn start_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StartMatchRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::start_match(&state, payload).await?))
}

/// Draw the next song for the active team and start its preview.
#[utoipa::path(
    post,
    path = "/match/draw",
    tag = "match",
    responses(
        (status = 200, description = "Song drawn", body = DrawResponse),
        (status = 409, description = "Not the team's turn to draw or catalog exhausted")
    )
)]
pub async fn draw_song(State(state): State<SharedState>) -> Result<Json<DrawResponse>, AppError> {
    Ok(Json(match_service::draw_song(&state).await?))
}

/// Place the pending song in a team's timeline.
#[utoipa::path(
    post,
    path = "/match/place",
    tag = "match",
    request_body = PlaceSongRequest,
    responses(
        (status = 200, description = "Placement evaluated", body = PlacementResponse),
        (status = 409, description = "No pending song or index out of range")
    )
)]
pub async fn place_song(
    State(state): State<SharedState>,
    Json(payload): Json<PlaceSongRequest>,
) -> Result<Json<PlacementResponse>, AppError> {
    Ok(Json(match_service::place_song(&state, payload).await?))
}

/// Hand the turn to the next team.
#[utoipa::path(
    post,
    path = "/match/advance",
    tag = "match",
    responses(
        (status = 200, description = "Turn advanced", body = TurnResponse),
        (status = 409, description = "A song is pending or no match is running")
    )
)]
pub async fn advance_turn(
    State(state): State<SharedState>,
) -> Result<Json<TurnResponse>, AppError> {
    Ok(Json(match_service::advance_turn(&state).await?))
}

/// Drop the current match and return to setup.
#[utoipa::path(
    post,
    path = "/match/reset",
    tag = "match",
    responses((status = 200, description = "Match reset", body = MatchSummary))
)]
pub async fn reset_match(State(state): State<SharedState>) -> Json<MatchSummary> {
    Json(match_service::reset_match(&state).await)
}

/// Start a new match with the same teams, difficulty and win target.
#[utoipa::path(
    post,
    path = "/match/replay",
    tag = "match",
    responses(
        (status = 200, description = "Match restarted", body = MatchSummary),
        (status = 409, description = "No match to replay"),
        (status = 503, description = "Song catalog unavailable")
    )
)]
pub async fn replay_match(
    State(state): State<SharedState>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::replay_match(&state).await?))
}
