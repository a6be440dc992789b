use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with the phase of the current match.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let phase = state.engine().lock().await.phase();
    HealthResponse::ok(phase)
}
