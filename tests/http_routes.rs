//! Router-level tests exercising status codes and JSON payloads.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hitster_back::{
    build_router,
    catalog::{CatalogProvider, StaticCatalog},
    config::AppConfig,
    playback::{EmbedKind, EmbedPlayback},
    state::{
        AppState,
        engine::GameEngine,
        game::{MediaRef, Song},
        shuffle::KeepOrder,
    },
};

fn songs() -> Vec<Song> {
    [("a", 1984), ("b", 1991), ("c", 2003), ("d", 1977)]
        .into_iter()
        .map(|(id, year)| Song {
            id: id.into(),
            artist: format!("Artist {id}"),
            title: format!("Title {id}"),
            year,
            media_ref: MediaRef::search(format!("artist {id}")),
        })
        .collect()
}

fn app_with(catalog: Arc<dyn CatalogProvider>) -> Router {
    let config = AppConfig::from_json(r#"{"min_win_count": 1}"#).unwrap();
    let engine = GameEngine::with_order(catalog, Box::new(KeepOrder));
    let playback = Arc::new(EmbedPlayback::new(EmbedKind::SearchEmbed, 80, 30));
    build_router(AppState::with_engine(config, engine, playback))
}

fn app() -> Router {
    app_with(Arc::new(StaticCatalog::uniform(songs())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn start_body() -> Value {
    json!({ "team_names": ["Red", "Blue"], "difficulty": "easy", "win_target": 3 })
}

#[tokio::test]
async fn healthcheck_reports_phase() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["phase"], "setup");
}

#[tokio::test]
async fn invalid_start_requests_are_bad_requests() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/match",
        Some(json!({ "team_names": ["Solo"], "difficulty": "easy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/match",
        Some(json!({ "team_names": ["Red", "  "], "difficulty": "easy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("team name"));
}

#[tokio::test]
async fn operations_out_of_phase_conflict() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/match/draw", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::POST, "/match/replay", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/match", Some(start_body())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::POST, "/match", Some(start_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/match/place",
        Some(json!({ "team_index": 0, "insert_index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn draw_and_place_round() {
    let app = app();
    send(&app, Method::POST, "/match", Some(start_body())).await;

    let (status, draw) = send(&app, Method::POST, "/match/draw", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draw["song"]["year"], 2003);
    assert_eq!(draw["playback"]["state"], "playing");

    let (_, current) = send(&app, Method::GET, "/match", None).await;
    assert_eq!(current["phase"], "awaiting_placement");
    assert_eq!(current["pending_song"]["id"], "c");
    assert!(current["pending_song"].get("year").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/match/place",
        Some(json!({ "team_index": 5, "insert_index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, placement) = send(
        &app,
        Method::POST,
        "/match/place",
        Some(json!({ "team_index": 0, "insert_index": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(placement["correct"], true);
    assert_eq!(placement["team"]["score"], 1);

    let (status, turn) = send(&app, Method::POST, "/match/advance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["active_team"], "Blue");

    let (status, reset) = send(&app, Method::POST, "/match/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["phase"], "setup");
}

#[tokio::test]
async fn missing_catalog_is_service_unavailable() {
    let app = app_with(Arc::new(StaticCatalog::default()));
    let (status, body) = send(&app, Method::POST, "/match", Some(start_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].as_str().unwrap().contains("catalog"));

    let (_, health) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(health["phase"], "setup");
}

#[tokio::test]
async fn playback_controls() {
    let app = app();

    let (status, _) = send(&app, Method::POST, "/playback/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/playback/volume",
        Some(json!({ "volume": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/playback/volume",
        Some(json!({ "volume": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["volume"], 40);

    let (status, body) = send(&app, Method::POST, "/playback/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "stopped");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = send(
        &app,
        Method::GET,
        hitster_back::routes::docs::OPENAPI_JSON_PATH,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/match/place").is_some());
}
