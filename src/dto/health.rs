use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::MatchPhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" while the process serves requests.
    pub status: String,
    /// Phase of the match currently held by the engine.
    pub phase: MatchPhase,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: MatchPhase) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
        }
    }
}
