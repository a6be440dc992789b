//! Direct preview controls for the game master. State changes reach SSE
//! subscribers through the playback forwarder.

use crate::{error::ServiceError, playback::PlaybackStatus, state::SharedState};

/// Current preview status.
pub fn status(state: &SharedState) -> PlaybackStatus {
    state.playback().state()
}

pub fn pause(state: &SharedState) -> Result<PlaybackStatus, ServiceError> {
    state.playback().pause()?;
    Ok(status(state))
}

pub fn resume(state: &SharedState) -> Result<PlaybackStatus, ServiceError> {
    state.playback().resume()?;
    Ok(status(state))
}

/// Stop the preview and unload it. Stopping an idle player is a no-op.
pub fn stop(state: &SharedState) -> PlaybackStatus {
    state.playback().stop();
    status(state)
}

pub fn set_volume(state: &SharedState, volume: u8) -> Result<PlaybackStatus, ServiceError> {
    state.playback().set_volume(volume)?;
    Ok(status(state))
}
