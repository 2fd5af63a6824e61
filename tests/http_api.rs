use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pair_quiz_back::{
    app,
    config::{AppConfig, StorageBackend},
    dao::quiz_store::MemoryQuizStore,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN: &str = "test-admin";

fn test_app() -> Router {
    let config = AppConfig {
        admin_token: ADMIN.into(),
        finalizer_enabled: false,
        storage: StorageBackend::Memory,
        ..AppConfig::default()
    };
    app(AppState::with_store(config, Arc::new(MemoryQuizStore::new())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn admin(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Admin-Token", ADMIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn player(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn create_user(app: &Router, login: &str) -> String {
    let (status, body) = send(app, admin("POST", "/sa/users", json!({ "login": login }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["accessToken"].as_str().unwrap().to_owned()
}

/// Create and publish `count` questions; the accepted answer of each is `answer-<n>`.
async fn seed_questions(app: &Router, count: usize) {
    for index in 0..count {
        let (status, body) = send(
            app,
            admin(
                "POST",
                "/sa/quiz/questions",
                json!({
                    "body": format!("What is answer number {index}?"),
                    "correctAnswers": [format!("answer-{index}")],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["published"], false);

        let id = body["id"].as_str().unwrap();
        let (status, _) = send(
            app,
            admin(
                "PUT",
                &format!("/sa/quiz/questions/{id}/publish"),
                json!({ "published": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let app = test_app();
    let request = Request::get("/healthcheck").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn admin_routes_require_the_admin_token() {
    let app = test_app();
    let request = Request::get("/sa/quiz/questions")
        .header("X-Admin-Token", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = test_app();
    let (status, body) = send(&app, admin("POST", "/sa/users", json!({ "login": "a b" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("validation failed"));

    let (status, _) = send(
        &app,
        admin(
            "POST",
            "/sa/quiz/questions",
            json!({ "body": "short", "correctAnswers": ["x"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_user(&app, "alice").await;
    let (status, _) = send(&app, admin("POST", "/sa/users", json!({ "login": "alice" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn quiz_routes_require_a_bearer_token() {
    let app = test_app();
    let request = Request::post("/pair-game-quiz/pairs/connection")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        player("POST", "/pair-game-quiz/pairs/connection", "garbage", None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_game_over_http() {
    let app = test_app();
    seed_questions(&app, 5).await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    let (status, _) = send(
        &app,
        player("GET", "/pair-game-quiz/pairs/my-current", &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, opened) = send(
        &app,
        player("POST", "/pair-game-quiz/pairs/connection", &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["status"], "PendingSecondPlayer");

    let (status, _) = send(
        &app,
        player("POST", "/pair-game-quiz/pairs/connection", &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, started) = send(
        &app,
        player("POST", "/pair-game-quiz/pairs/connection", &bob, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "Active");
    assert_eq!(started["id"], opened["id"]);
    let questions = started["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 5);

    // Answers are derived from the question body, "What is answer number N?".
    let answer_for = |question: &Value| {
        let body = question["body"].as_str().unwrap();
        let number = body
            .trim_start_matches("What is answer number ")
            .trim_end_matches('?');
        format!("answer-{number}")
    };

    for question in &questions {
        let (status, body) = send(
            &app,
            player(
                "POST",
                "/pair-game-quiz/pairs/my-current/answers",
                &alice,
                Some(json!({ "answer": answer_for(question) })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(
            &app,
            player(
                "POST",
                "/pair-game-quiz/pairs/my-current/answers",
                &bob,
                Some(json!({ "answer": "wrong" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let game_id = opened["id"].as_str().unwrap();
    let (status, finished) = send(
        &app,
        player("GET", &format!("/pair-game-quiz/pairs/{game_id}"), &bob, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "Finished");
    assert_eq!(finished["firstPlayerProgress"]["score"], 5);
    assert_eq!(finished["secondPlayerProgress"]["score"], 0);
    assert_eq!(
        finished["firstPlayerProgress"]["answers"]
            .as_array()
            .unwrap()
            .len(),
        5
    );
    assert!(finished["questions"].as_array().unwrap().is_empty());

    let (status, stats) = send(
        &app,
        player("GET", "/pair-game-quiz/users/my-statistic", &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["winsCount"], 1);
    assert_eq!(stats["avgScores"], 5.0);

    let (status, mine) = send(&app, player("GET", "/pair-game-quiz/pairs/my", &bob, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["totalCount"], 1);
    assert_eq!(mine["items"][0]["id"], opened["id"]);

    let request = Request::get("/pair-game-quiz/users/top?sort=sumScore%20desc&pageSize=1")
        .body(Body::empty())
        .unwrap();
    let (status, top) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top["totalCount"], 2);
    assert_eq!(top["pagesCount"], 2);
    assert_eq!(top["items"][0]["player"]["login"], "alice");
    assert_eq!(top["items"][0]["sumScore"], 5);
}

#[tokio::test]
async fn game_lookup_validates_id_and_participation() {
    let app = test_app();
    seed_questions(&app, 5).await;
    let alice = create_user(&app, "alice").await;
    let carol = create_user(&app, "carol").await;

    let (_, opened) = send(
        &app,
        player("POST", "/pair-game-quiz/pairs/connection", &alice, None),
    )
    .await;
    let game_id = opened["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        player("GET", "/pair-game-quiz/pairs/not-a-uuid", &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        player("GET", &format!("/pair-game-quiz/pairs/{game_id}"), &carol, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        player("GET", &format!("/pair-game-quiz/pairs/{unknown}"), &alice, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn leaderboard_rejects_unknown_sort_fields() {
    let app = test_app();
    let request = Request::get("/pair-game-quiz/users/top?sort=login%20asc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("login"));
}

#[tokio::test]
async fn deleted_questions_disappear_from_the_bank() {
    let app = test_app();
    seed_questions(&app, 2).await;

    let request = Request::get("/sa/quiz/questions")
        .header("X-Admin-Token", ADMIN)
        .body(Body::empty())
        .unwrap();
    let (_, listed) = send(&app, request).await;
    let id = listed[0]["id"].as_str().unwrap().to_owned();

    let request = Request::delete(format!("/sa/quiz/questions/{id}"))
        .header("X-Admin-Token", ADMIN)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::get("/sa/quiz/questions")
        .header("X-Admin-Token", ADMIN)
        .body(Body::empty())
        .unwrap();
    let (_, listed) = send(&app, request).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let request = Request::delete(format!("/sa/quiz/questions/{id}"))
        .header("X-Admin-Token", ADMIN)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
