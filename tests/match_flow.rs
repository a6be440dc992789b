//! Service-level match flow against an in-memory catalog with a fixed draw order.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::{self, BoxFuture};
use hitster_back::{
    catalog::{CatalogError, CatalogProvider, CatalogResult, StaticCatalog},
    config::AppConfig,
    dto::game::{PlaceSongRequest, StartMatchRequest},
    error::ServiceError,
    playback::{EmbedKind, EmbedPlayback, PlayerState},
    services::match_service,
    state::{
        AppState, SharedState,
        engine::GameEngine,
        game::{Difficulty, MatchPhase, MediaRef, Song},
        shuffle::KeepOrder,
    },
};

fn song(id: &str, year: i32) -> Song {
    Song {
        id: id.into(),
        artist: format!("Artist {id}"),
        title: format!("Title {id}"),
        year,
        media_ref: MediaRef::search(format!("artist {id} title {id}")),
    }
}

fn catalog() -> Vec<Song> {
    vec![
        song("a", 1980),
        song("b", 1990),
        song("c", 2000),
        song("d", 1970),
        song("e", 2010),
        song("f", 1965),
    ]
}

fn test_state_with(
    config: &str,
    catalog: Arc<dyn CatalogProvider>,
    playback: EmbedKind,
) -> SharedState {
    let config = AppConfig::from_json(config).unwrap();
    let engine = GameEngine::with_order(catalog, Box::new(KeepOrder));
    let playback = Arc::new(EmbedPlayback::new(playback, 80, 30));
    AppState::with_engine(config, engine, playback)
}

fn test_state() -> SharedState {
    test_state_with(
        r#"{"min_win_count": 1}"#,
        Arc::new(StaticCatalog::uniform(catalog())),
        EmbedKind::SearchEmbed,
    )
}

fn start_request(win_target: Option<u32>) -> StartMatchRequest {
    StartMatchRequest {
        team_names: vec!["Red".into(), "Blue".into()],
        difficulty: Difficulty::Easy,
        win_target,
    }
}

fn place(team_index: usize, insert_index: usize) -> PlaceSongRequest {
    PlaceSongRequest {
        team_index,
        insert_index,
    }
}

struct StalledCatalog;

impl CatalogProvider for StalledCatalog {
    fn fetch(&self, _difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>> {
        Box::pin(future::pending())
    }
}

/// Serves the catalog on the first fetch only.
struct OneShotCatalog {
    fetches: AtomicUsize,
}

impl CatalogProvider for OneShotCatalog {
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, CatalogResult<Vec<Song>>> {
        let result = if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(catalog())
        } else {
            Err(CatalogError::MissingTier(difficulty))
        };
        Box::pin(future::ready(result))
    }
}

#[tokio::test]
async fn full_match_until_victory_then_replay() {
    let state = test_state();

    let summary = match_service::start_match(&state, start_request(Some(2)))
        .await
        .unwrap();
    assert_eq!(summary.phase, MatchPhase::Playing);
    assert_eq!(summary.teams.len(), 2);
    assert_eq!(summary.teams[0].timeline[0].song.year, 1980);
    assert_eq!(summary.teams[1].timeline[0].song.year, 1990);
    assert!(summary.teams.iter().all(|team| team.score == 0));
    assert_eq!(summary.remaining_songs, 4);

    // Red: 2000 after 1980.
    let draw = match_service::draw_song(&state).await.unwrap();
    assert_eq!(draw.song.year, 2000);
    assert_eq!(draw.active_team_index, 0);
    assert!(draw.playback_error.is_none());
    assert_eq!(draw.playback.state, PlayerState::Playing);

    let err = match_service::advance_turn(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let placement = match_service::place_song(&state, place(0, 1)).await.unwrap();
    assert!(placement.correct);
    assert!(!placement.victory);
    assert_eq!(placement.team.score, 1);
    assert_eq!(state.playback().state().state, PlayerState::Stopped);

    let turn = match_service::advance_turn(&state).await.unwrap();
    assert_eq!(turn.active_team_index, 1);
    assert_eq!(turn.active_team, "Blue");

    // Blue: 1970 after 1990 is wrong.
    match_service::draw_song(&state).await.unwrap();
    let placement = match_service::place_song(&state, place(1, 1)).await.unwrap();
    assert!(!placement.correct);
    assert_eq!(placement.correct_year, Some(1970));
    assert_eq!(placement.team.timeline.len(), 1);

    match_service::advance_turn(&state).await.unwrap();

    // Red: 2010 at the end wins.
    match_service::draw_song(&state).await.unwrap();
    let placement = match_service::place_song(&state, place(0, 2)).await.unwrap();
    assert!(placement.victory);
    assert_eq!(placement.winning_team, Some(0));

    let current = match_service::current_match(&state).await;
    assert_eq!(current.phase, MatchPhase::Victory);
    assert_eq!(current.winner, Some(0));

    let err = match_service::draw_song(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let replay = match_service::replay_match(&state).await.unwrap();
    assert_eq!(replay.phase, MatchPhase::Playing);
    assert_ne!(replay.id, current.id);
    assert_eq!(replay.teams[0].name, "Red");
    assert_eq!(replay.teams[0].target, 2);
    assert!(replay.winner.is_none());
    assert_eq!(replay.remaining_songs, 4);
}

#[tokio::test]
async fn start_is_rejected_while_a_match_runs() {
    let state = test_state();
    match_service::start_match(&state, start_request(None))
        .await
        .unwrap();

    let err = match_service::start_match(&state, start_request(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let summary = match_service::reset_match(&state).await;
    assert_eq!(summary.phase, MatchPhase::Setup);
    assert!(summary.teams.is_empty());
    match_service::start_match(&state, start_request(None))
        .await
        .unwrap();
}

#[tokio::test]
async fn win_target_outside_configured_bounds_is_rejected() {
    let state = test_state_with(
        r#"{"min_win_count": 5, "max_win_count": 20}"#,
        Arc::new(StaticCatalog::uniform(catalog())),
        EmbedKind::SearchEmbed,
    );

    let err = match_service::start_match(&state, start_request(Some(3)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(
        match_service::current_match(&state).await.phase,
        MatchPhase::Setup
    );

    let summary = match_service::start_match(&state, start_request(None))
        .await
        .unwrap();
    assert_eq!(summary.teams[0].target, 10);
}

#[tokio::test]
async fn stalled_catalog_times_out_and_leaves_setup_intact() {
    let state = test_state_with(
        r#"{"min_win_count": 1, "catalog_timeout_ms": 50}"#,
        Arc::new(StalledCatalog),
        EmbedKind::SearchEmbed,
    );

    let err = match_service::start_match(&state, start_request(Some(3)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Catalog(CatalogError::Timeout(deadline)) if deadline == Duration::from_millis(50)
    ));
    assert_eq!(
        match_service::current_match(&state).await.phase,
        MatchPhase::Setup
    );
}

#[tokio::test]
async fn preview_failure_does_not_undo_the_draw() {
    let state = test_state_with(
        r#"{"min_win_count": 1}"#,
        Arc::new(StaticCatalog::uniform(catalog())),
        EmbedKind::TrackEmbed,
    );
    match_service::start_match(&state, start_request(Some(3)))
        .await
        .unwrap();

    let draw = match_service::draw_song(&state).await.unwrap();
    assert!(draw.playback_error.is_some());
    assert_eq!(draw.playback.state, PlayerState::Stopped);

    let current = match_service::current_match(&state).await;
    assert_eq!(current.phase, MatchPhase::AwaitingPlacement);
    assert_eq!(current.pending_song.map(|song| song.id), Some(draw.song.id));
}

#[tokio::test]
async fn public_stream_hides_the_pending_year() {
    let state = test_state();
    let mut events = state.public_sse().subscribe();

    match_service::start_match(&state, start_request(Some(3)))
        .await
        .unwrap();
    let started = events.recv().await.unwrap();
    assert_eq!(started.event.as_deref(), Some("match.snapshot"));

    match_service::draw_song(&state).await.unwrap();
    let drawn = events.recv().await.unwrap();
    assert_eq!(drawn.event.as_deref(), Some("song.drawn"));
    let payload: serde_json::Value = serde_json::from_str(&drawn.data).unwrap();
    assert_eq!(payload["song"]["id"], "c");
    assert!(payload["song"].get("year").is_none());

    match_service::place_song(&state, place(0, 1)).await.unwrap();
    let placed = events.recv().await.unwrap();
    assert_eq!(placed.event.as_deref(), Some("placement.result"));
    let payload: serde_json::Value = serde_json::from_str(&placed.data).unwrap();
    assert_eq!(payload["song"]["year"], 2000);
    assert_eq!(payload["correct"], true);

    let snapshot = events.recv().await.unwrap();
    assert_eq!(snapshot.event.as_deref(), Some("match.snapshot"));

    match_service::reset_match(&state).await;
    let reset = events.recv().await.unwrap();
    assert_eq!(reset.event.as_deref(), Some("match.reset"));
}

#[tokio::test]
async fn failed_replay_announces_the_dropped_match() {
    let state = test_state_with(
        r#"{"min_win_count": 1}"#,
        Arc::new(OneShotCatalog {
            fetches: AtomicUsize::new(0),
        }),
        EmbedKind::SearchEmbed,
    );
    match_service::start_match(&state, start_request(Some(3)))
        .await
        .unwrap();
    let mut events = state.public_sse().subscribe();

    let err = match_service::replay_match(&state).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Catalog(CatalogError::MissingTier(Difficulty::Easy))
    ));
    assert_eq!(
        match_service::current_match(&state).await.phase,
        MatchPhase::Setup
    );

    let reset = events.try_recv().unwrap();
    assert_eq!(reset.event.as_deref(), Some("match.reset"));
    let payload: serde_json::Value = serde_json::from_str(&reset.data).unwrap();
    assert_eq!(payload["phase"], "setup");
    assert_eq!(payload["teams"], serde_json::json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn preview_never_outlives_a_concurrent_reset() {
    let state = test_state();

    for _ in 0..100 {
        match_service::start_match(&state, start_request(Some(3)))
            .await
            .unwrap();

        let draw = tokio::spawn({
            let state = state.clone();
            async move { match_service::draw_song(&state).await }
        });
        let reset = tokio::spawn({
            let state = state.clone();
            async move { match_service::reset_match(&state).await }
        });
        let _ = draw.await.unwrap();
        reset.await.unwrap();

        assert_eq!(
            match_service::current_match(&state).await.phase,
            MatchPhase::Setup
        );
        assert_eq!(state.playback().state().state, PlayerState::Stopped);
    }
}
