//! Backend API Integration Tests
//!
//! Tests for the Axum HTTP endpoints using Router::oneshot pattern.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use backend::api::{self, AppState};
use opening_trainer::session::Opponent;
use opening_trainer::{OpeningCatalog, OpeningTrieIndex};
use serde_json::{json, Value};
use tower::ServiceExt;

const ITALIAN: &str = "[Event \"Italian\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 *";
const CARO_KANN: &str = "[Color \"Black\"]\n\n1. e4 c6 2. d4 d5 *";

/// Helper to create test state with the Italian (id 1) and Caro-Kann (id 2) loaded
fn test_state() -> AppState {
    let mut catalog = OpeningCatalog::new();
    let mut index = OpeningTrieIndex::new();
    catalog
        .add_opening(&mut index, "Italian Game", ITALIAN)
        .unwrap();
    catalog
        .add_opening(&mut index, "Caro Kann", CARO_KANN)
        .unwrap();
    AppState::new(catalog, index, Opponent::offline(), Some(42))
}

/// Helper to create test router
fn test_router() -> Router {
    api::router(test_state())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_users_lists_default_player() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/users", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["1: Player 1"]));
}

#[tokio::test]
async fn test_openings_list_and_toggle() {
    let app = test_router();

    let (_, list) = send(&app, "GET", "/openings?user_id=1", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "Italian Game");
    assert_eq!(list[0]["color"], "white");
    assert_eq!(list[1]["color"], "black");
    assert_eq!(list[0]["is_learned"], false);

    let (status, body) = send(&app, "POST", "/openings/1/toggle_learn?user_id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "learned");

    let (_, detail) = send(&app, "GET", "/openings/1", None).await;
    assert_eq!(detail["is_learned"], true);
    assert!(detail["pgn"].as_str().unwrap().contains("Bc5"));

    let (_, body) = send(&app, "POST", "/openings/1/toggle_learn", None).await;
    assert_eq!(body["status"], "unlearned");
}

#[tokio::test]
async fn test_unknown_opening_is_404() {
    let app = test_router();

    let (status, _) = send(&app, "GET", "/openings/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/openings/99/toggle_learn", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_adds_and_rejects() {
    let app = test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/admin/upload",
        Some(json!({"name": "London", "pgn_content": "1. d4 d5 2. Bf4 *"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["opening_id"], 3);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/upload",
        Some(json!({"name": "London", "pgn_content": "1. d4 d5 2. Bf4 *"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &app,
        "POST",
        "/admin/upload",
        Some(json!({"name": "Broken", "pgn_content": "1. e4 e5 2. Ke3 *"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_game_start_unknown_user_is_404() {
    let app = test_router();
    let (status, _) = send(
        &app,
        "POST",
        "/game/start",
        Some(json!({"user_id": 9, "color": "white"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_italian_game_through_http() {
    let app = test_router();
    send(&app, "POST", "/openings/1/toggle_learn", None).await;

    let (status, start) = send(
        &app,
        "POST",
        "/game/start",
        Some(json!({"user_id": 1, "color": "white"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["mode"], "theory");
    assert_eq!(start["message"], "Game started as White.");
    assert!(start["opponent_move"].is_null());
    let session_id = start["session_id"].as_str().unwrap().to_string();

    let (_, first) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "e4"})),
    )
    .await;
    assert_eq!(first["legal"], true);
    assert_eq!(first["opponent_move"], "e5");
    assert_eq!(first["remaining_opening_ids"], json!([1]));

    // Illegal moves are answered with the unchanged state
    let (status, rejected) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "Ke3"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["legal"], false);
    assert_eq!(rejected["fen"], first["fen"]);

    let (_, mistake) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "h3"})),
    )
    .await;
    assert_eq!(mistake["mistake_made"], true);
    assert_eq!(mistake["mode"], "engine");
    assert_eq!(mistake["remaining_opening_ids"], json!([]));
    assert!(mistake["opponent_move"].is_string());
}

#[tokio::test]
async fn test_black_game_starts_with_opponent_move() {
    let app = test_router();
    send(&app, "POST", "/openings/2/toggle_learn", None).await;

    let (_, start) = send(
        &app,
        "POST",
        "/game/start",
        Some(json!({"user_id": 1, "color": "black"})),
    )
    .await;
    assert_eq!(start["color"], "black");
    assert_eq!(start["mode"], "theory");
    assert_eq!(start["opponent_move"], "e4");
    assert!(start["initial_fen"].as_str().unwrap().contains(" b "));
}

#[tokio::test]
async fn test_move_for_unknown_session_is_404() {
    let app = test_router();
    let (status, _) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({
            "session_id": "00000000-0000-0000-0000-000000000000",
            "move_san": "e4"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_then_list() {
    let app = test_router();
    let (status, body) = send(&app, "POST", "/users", Some(json!({"name": "Player 2"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);

    let (_, users) = send(&app, "GET", "/users", None).await;
    assert_eq!(users, json!(["1: Player 1", "2: Player 2"]));

    let (status, _) = send(&app, "POST", "/users", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_finished_game_releases_its_session() {
    let state = test_state();
    let app = api::router(state.clone());
    send(
        &app,
        "POST",
        "/admin/upload",
        Some(json!({
            "name": "Fools Mate",
            "pgn_content": "[Color \"Black\"]\n\n1. f3 e5 2. g4 Qh4# 0-1"
        })),
    )
    .await;
    send(&app, "POST", "/openings/3/toggle_learn", None).await;

    let (_, start) = send(
        &app,
        "POST",
        "/game/start",
        Some(json!({"user_id": 1, "color": "black"})),
    )
    .await;
    assert_eq!(start["opponent_move"], "f3");
    let session_id = start["session_id"].as_str().unwrap().to_string();
    assert_eq!(state.session_count(), 1);

    let (_, reply) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "e5"})),
    )
    .await;
    assert_eq!(reply["opponent_move"], "g4");

    let (_, mate) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "Qh4#"})),
    )
    .await;
    assert_eq!(mate["game_over"], true);
    assert_eq!(mate["mode"], "engine");
    assert!(mate["opponent_move"].is_null());
    assert_eq!(state.session_count(), 0);

    let (status, _) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"session_id": session_id, "move_san": "Kf2"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_abandoned_game_can_be_deleted() {
    let state = test_state();
    let app = api::router(state.clone());

    let (_, start) = send(
        &app,
        "POST",
        "/game/start",
        Some(json!({"user_id": 1, "color": "white"})),
    )
    .await;
    let session_id = start["session_id"].as_str().unwrap().to_string();
    assert_eq!(state.session_count(), 1);

    let uri = format!("/game/{}", session_id);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.session_count(), 0);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
