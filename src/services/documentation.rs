use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Hitster Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::game::current_match,
        crate::routes::game::start_match,
        crate::routes::game::draw_song,
        crate::routes::game::place_song,
        crate::routes::game::advance_turn,
        crate::routes::game::reset_match,
        crate::routes::game::replay_match,
        crate::routes::playback::status,
        crate::routes::playback::pause,
        crate::routes::playback::resume,
        crate::routes::playback::stop,
        crate::routes::playback::set_volume,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::StartMatchRequest,
            crate::dto::game::PlaceSongRequest,
            crate::dto::game::MatchSummary,
            crate::dto::game::DrawResponse,
            crate::dto::game::PlacementResponse,
            crate::dto::game::TurnResponse,
            crate::dto::playback::VolumeRequest,
            crate::dto::sse::SongDrawnEvent,
            crate::dto::sse::PlacementEvent,
            crate::dto::sse::TurnAdvancedEvent,
            crate::playback::PlaybackStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "match", description = "Match lifecycle and turn operations"),
        (name = "playback", description = "Song preview controls"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
