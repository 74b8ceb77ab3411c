//! Router tests against a temporary SQLite database.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use common::setup_test_db;
use tictactoe_server::{AppState, router};

fn app() -> (NamedTempFile, Router) {
    let (db, repo) = setup_test_db();
    (db, router(AppState::new(repo)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/users", Some(json!({ "username": username }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn start_game(app: &Router) -> (i64, i64, i64) {
    let alice = register(app, "alice").await;
    let bob = register(app, "bob").await;
    let (status, body) = send(
        app,
        Method::POST,
        "/games",
        Some(json!({ "first_player_id": alice, "second_player_id": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (body["id"].as_i64().unwrap(), alice, bob)
}

async fn play(app: &Router, game: i64, player: i64, x: i32, y: i32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/games/{}/moves", game),
        Some(json!({ "player_id": player, "x": x, "y": y })),
    )
    .await
}

#[tokio::test]
async fn test_register_and_list_users() {
    let (_db, app) = app();
    let id = register(&app, "  alice ").await;

    let (status, body) = send(&app, Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, body) = send(&app, Method::POST, "/users", Some(json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("alice"));

    let (status, _) = send(&app, Method::POST, "/users", Some(json!({ "username": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_game_view() {
    let (_db, app) = app();
    let (game, alice, _) = start_game(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/games/{}", game), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "first_to_move");
    assert_eq!(body["status_label"], "First Player To Move");
    assert_eq!(body["next_player_id"], alice);
    assert_eq!(body["board"], json!([[null, null, null], [null, null, null], [null, null, null]]));
    assert_eq!(body["moves"], json!([]));
}

#[tokio::test]
async fn test_play_to_a_win() {
    let (_db, app) = app();
    let (game, alice, bob) = start_game(&app).await;

    let (status, body) = play(&app, game, alice, 0, 0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "second_to_move");
    assert_eq!(body["next_player_id"], bob);
    assert_eq!(body["board"][0][0], "first");

    play(&app, game, bob, 1, 0).await;
    play(&app, game, alice, 0, 1).await;
    play(&app, game, bob, 1, 1).await;
    let (status, body) = play(&app, game, alice, 0, 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "first_wins");
    assert_eq!(body["next_player_id"], Value::Null);
    assert_eq!(body["moves"].as_array().unwrap().len(), 5);

    let (status, body) = play(&app, game, bob, 2, 2).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot make move on finished game");

    let (_, body) = send(&app, Method::GET, "/games", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_move_errors() {
    let (_db, app) = app();
    let (game, alice, bob) = start_game(&app).await;

    let (status, body) = play(&app, game, bob, 0, 0).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "It is not your turn");

    let (status, body) = play(&app, game, alice, 3, 0).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Invalid coordinates", "field": "coordinates" }));

    play(&app, game, alice, 0, 0).await;
    let (status, body) = play(&app, game, bob, 0, 0).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Square is not empty", "field": "coordinates" }));

    let (status, _) = play(&app, 999, alice, 1, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_move_comment() {
    let (_db, app) = app();
    let (game, alice, _) = start_game(&app).await;
    let (_, body) = play(&app, game, alice, 1, 1).await;
    let move_id = body["moves"][0]["id"].as_i64().unwrap();

    let uri = format!("/games/{}/moves/{}", game, move_id);
    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "comment": "centre" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"], "centre");

    let long = "c".repeat(301);
    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "comment": long }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "comment");
}

#[tokio::test]
async fn test_user_game_filters() {
    let (_db, app) = app();
    let (game, alice, bob) = start_game(&app).await;

    let uri = |user: i64, query: &str| format!("/users/{}/games{}", user, query);
    let (_, body) = send(&app, Method::GET, &uri(alice, "?awaiting=true"), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, Method::GET, &uri(bob, "?awaiting=true"), None).await;
    assert!(body.as_array().unwrap().is_empty());

    play(&app, game, alice, 0, 0).await;
    let (_, body) = send(&app, Method::GET, &uri(bob, "?awaiting=true"), None).await;
    assert_eq!(body[0]["id"], game);
    let (_, body) = send(&app, Method::GET, &uri(bob, "?active=true"), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invitation_flow() {
    let (_db, app) = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/invitations",
        Some(json!({ "from_user_id": alice, "to_user_id": bob, "message": "fancy a game?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let invitation = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, Method::GET, &format!("/users/{}/invitations", bob), None).await;
    assert_eq!(body[0]["message"], "fancy a game?");

    let accept = format!("/invitations/{}/accept", invitation);
    let (status, _) = send(&app, Method::POST, &accept, Some(json!({ "user_id": alice }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, &accept, Some(json!({ "user_id": bob }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first_player_id"], bob);
    assert_eq!(body["second_player_id"], alice);
    assert_eq!(body["next_player_id"], bob);

    let (status, _) = send(&app, Method::POST, &accept, Some(json!({ "user_id": bob }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_decline_and_self_invitation() {
    let (_db, app) = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/invitations",
        Some(json!({ "from_user_id": alice, "to_user_id": alice })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        Method::POST,
        "/invitations",
        Some(json!({ "from_user_id": bob, "to_user_id": alice })),
    )
    .await;
    let decline = format!("/invitations/{}/decline", body["id"].as_i64().unwrap());
    let (status, body) = send(&app, Method::POST, &decline, Some(json!({ "user_id": alice }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, body) = send(&app, Method::GET, &format!("/users/{}/invitations", alice), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_huge_coordinate_is_invalid_move() {
    let (_db, app) = app();
    let (game, alice, _) = start_game(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/games/{}/moves", game),
        Some(json!({ "player_id": alice, "x": 5_000_000_000_i64, "y": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "error": "Invalid coordinates", "field": "coordinates" }));
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let (_db, app) = app();
    let (game, alice, _) = start_game(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/games/{}/moves", game),
        Some(json!({ "player_id": alice, "x": "a", "y": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);
    assert!(body.get("field").is_none());

    let (status, body) = send(&app, Method::GET, "/games/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/users/{}/games?active=maybe", alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);

    let (status, _) = send(&app, Method::GET, &format!("/games/{}", game), None).await;
    assert_eq!(status, StatusCode::OK);
}
