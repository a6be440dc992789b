use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::playback::VolumeRequest, error::AppError, playback::PlaybackStatus,
    services::playback_service, state::SharedState,
};

/// Preview player controls.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/playback", get(status))
        .route("/playback/pause", post(pause))
        .route("/playback/resume", post(resume))
        .route("/playback/stop", post(stop))
        .route("/playback/volume", put(set_volume))
}

#[utoipa::path(
    get,
    path = "/playback",
    tag = "playback",
    responses((status = 200, description = "Current preview status", body = PlaybackStatus))
)]
/// Return the preview player status.
pub async fn status(State(state): State<SharedState>) -> Json<PlaybackStatus> {
    Json(playback_service::status(&state))
}

#[utoipa::path(
    post,
    path = "/playback/pause",
    tag = "playback",
    responses(
        (status = 200, description = "Preview paused", body = PlaybackStatus),
        (status = 409, description = "No preview loaded")
    )
)]
/// Pause the loaded preview.
pub async fn pause(State(state): State<SharedState>) -> Result<Json<PlaybackStatus>, AppError> {
    Ok(Json(playback_service::pause(&state)?))
}

#[utoipa::path(
    post,
    path = "/playback/resume",
    tag = "playback",
    responses(
        (status = 200, description = "Preview resumed", body = PlaybackStatus),
        (status = 409, description = "No preview loaded")
    )
)]
/// Resume the loaded preview.
pub async fn resume(State(state): State<SharedState>) -> Result<Json<PlaybackStatus>, AppError> {
    Ok(Json(playback_service::resume(&state)?))
}

#[utoipa::path(
    post,
    path = "/playback/stop",
    tag = "playback",
    responses((status = 200, description = "Preview stopped", body = PlaybackStatus))
)]
/// Stop and unload the preview.
pub async fn stop(State(state): State<SharedState>) -> Json<PlaybackStatus> {
    Json(playback_service::stop(&state))
}

#[utoipa::path(
    put,
    path = "/playback/volume",
    tag = "playback",
    request_body = VolumeRequest,
    responses(
        (status = 200, description = "Volume updated", body = PlaybackStatus),
        (status = 400, description = "Volume out of range"),
        (status = 409, description = "Provider has no volume control")
    )
)]
/// Change the preview volume.
pub async fn set_volume(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<VolumeRequest>>,
) -> Result<Json<PlaybackStatus>, AppError> {
    Ok(Json(playback_service::set_volume(&state, payload.volume)?))
}
