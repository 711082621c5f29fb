use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn request(method: &str, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn october_close() -> Value {
    json!({
        "month": "2025-10",
        "received_minor": 200_000,
        "entries": [
            { "description": "Aluguel", "amount_minor": 80_000, "paid": true },
            { "description": "Internet", "amount_minor": 10_000, "paid": false }
        ]
    })
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let app = app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/months/latest")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/session")
        .header(header::AUTHORIZATION, basic("alice", "pass"))
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_returns_the_user() {
    let app = app().await;
    let (status, body) = send(&app, request("POST", "/session", "alice", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn close_then_latest_round_trip() {
    let app = app().await;

    let (status, created) = send(
        &app,
        request("POST", "/months", "alice", Some(october_close())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["month"], "2025-10");
    assert_eq!(created["received_minor"], 200_000);
    assert_eq!(created["discounts_minor"], 80_000);
    assert_eq!(created["remainder_minor"], 120_000);

    let (status, latest) = send(&app, request("GET", "/months/latest", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["month"], created);
}

#[tokio::test]
async fn latest_is_null_before_any_close() {
    let app = app().await;
    let (status, latest) = send(&app, request("GET", "/months/latest", "alice", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["month"], Value::Null);
}

#[tokio::test]
async fn months_of_other_users_are_hidden() {
    let app = app().await;
    send(
        &app,
        request("POST", "/months", "alice", Some(october_close())),
    )
    .await;

    let (_, latest) = send(&app, request("GET", "/months/latest", "bob", None)).await;
    assert_eq!(latest["month"], Value::Null);
    let (_, list) = send(&app, request("GET", "/months", "bob", None)).await;
    assert_eq!(list["months"], json!([]));
}

#[tokio::test]
async fn list_honours_limit() {
    let app = app().await;
    for month in ["2025-08", "2025-09", "2025-10"] {
        let mut body = october_close();
        body["month"] = json!(month);
        send(&app, request("POST", "/months", "alice", Some(body))).await;
    }

    let (status, list) = send(&app, request("GET", "/months?limit=2", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    let months: Vec<&str> = list["months"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["month"].as_str().unwrap())
        .collect();
    assert_eq!(months, vec!["2025-10", "2025-09"]);
}

#[tokio::test]
async fn pt_br_label_is_accepted() {
    let app = app().await;
    let mut body = october_close();
    body["month"] = json!("outubro de 2025");

    let (status, created) = send(&app, request("POST", "/months", "alice", Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["month"], "2025-10");
}

#[tokio::test]
async fn invalid_close_requests_are_422() {
    let app = app().await;

    let mut bad_month = october_close();
    bad_month["month"] = json!("someday");
    let (status, body) = send(&app, request("POST", "/months", "alice", Some(bad_month))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("someday"));

    let mut negative = october_close();
    negative["received_minor"] = json!(-1);
    let (status, _) = send(&app, request("POST", "/months", "alice", Some(negative))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, latest) = send(&app, request("GET", "/months/latest", "alice", None)).await;
    assert_eq!(latest["month"], Value::Null);
}

#[tokio::test]
async fn zero_limit_is_422() {
    let app = app().await;
    let (status, _) = send(&app, request("GET", "/months?limit=0", "alice", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
