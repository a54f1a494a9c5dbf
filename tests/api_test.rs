use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sharenote::server::build_router;
use sharenote::{MemoryStore, NoteService, SqliteStore};
use tower::ServiceExt;

const BASE: &str = "https://notes.example/share";

fn app() -> Router {
    let notes = NoteService::new(Arc::new(MemoryStore::new()), BASE).unwrap();
    build_router(notes, &[]).unwrap()
}

async fn raw(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = raw(app, request).await;
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

async fn create(app: &Router, title: &str, content: &str) -> Value {
    let (status, note) = send(
        app,
        Method::POST,
        "/notes",
        Some(json!({ "title": title, "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    note
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Notes API is running" }));
}

#[tokio::test]
async fn test_create_returns_share_fields() {
    let app = app();
    let note = create(&app, "A", "B").await;

    assert_eq!(note["title"], "A");
    assert_eq!(note["content"], "B");
    assert!(note["id"].is_string());

    let share_id = note["share_id"].as_str().unwrap();
    assert_eq!(note["share_url"], format!("{BASE}/{share_id}"));
}

#[tokio::test]
async fn test_create_rejects_missing_field() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/notes", Some(json!({ "title": "only" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "content"]));
    assert_eq!(body["detail"][0]["type"], "missing");
}

#[tokio::test]
async fn test_create_rejects_wrong_type_and_empty_values() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/notes",
        Some(json!({ "title": 1, "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "title"]));
    assert_eq!(body["detail"][0]["type"], "string_type");

    let (status, body) = send(
        &app,
        Method::POST,
        "/notes",
        Some(json!({ "title": "", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "title"]));
}

#[tokio::test]
async fn test_create_accepts_whitespace_only_values() {
    let app = app();

    for body in [
        json!({ "title": "  ", "content": "x" }),
        json!({ "title": "x", "content": "  " }),
    ] {
        let (status, note) = send(&app, Method::POST, "/notes", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(note["title"], body["title"]);
        assert_eq!(note["content"], body["content"]);
    }
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/notes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = raw(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_returns_every_note() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, "one", "1").await;
    create(&app, "two", "2").await;

    let (_, body) = send(&app, Method::GET, "/notes", None).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["one", "two"]);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_404() {
    let app = app();
    let missing = format!("/notes/{}", uuid::Uuid::new_v4());

    for uri in [missing.as_str(), "/notes/not-an-id"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Note not found" }));

        let (status, _) = send(
            &app,
            Method::PUT,
            uri,
            Some(json!({ "title": "t", "content": "c" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_note_is_reachable_only_by_its_rendered_id() {
    let app = app();
    let note = create(&app, "A", "B").await;
    let id = note["id"].as_str().unwrap();

    let aliases = [
        id.replace('-', ""),
        format!("urn:uuid:{id}"),
        id.to_uppercase(),
    ];
    for alias in &aliases {
        let uri = format!("/notes/{alias}");
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "detail": "Note not found" }));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, fetched) = send(&app, Method::GET, &format!("/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, note);
}

#[tokio::test]
async fn test_update_validates_body_before_lookup() {
    let app = app();
    let note = create(&app, "A", "B").await;
    let uri = format!("/notes/{}", note["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "title": "A2" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_share_paths() {
    let app = app();
    let note = create(&app, "shared", "body").await;
    let share_uri = format!("/share/{}", note["share_id"].as_str().unwrap());
    let note_uri = format!("/notes/{}", note["id"].as_str().unwrap());

    let (status, shared) = send(&app, Method::GET, &share_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared, note);

    let (status, body) = send(&app, Method::DELETE, &share_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Shared note deleted" }));

    let (status, _) = send(&app, Method::GET, &note_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, &share_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Shared note not found" }));

    let (status, _) = send(&app, Method::DELETE, &share_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_lifecycle_scenario() {
    let notes = NoteService::new(Arc::new(SqliteStore::open_in_memory("notes").unwrap()), BASE)
        .unwrap();
    let app = build_router(notes, &[]).unwrap();

    let created = create(&app, "A", "B").await;
    let uri = format!("/notes/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "A2", "content": "B2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "A2");
    assert_eq!(updated["content"], "B2");
    assert_eq!(updated["share_id"], created["share_id"]);
    assert_eq!(updated["share_url"], created["share_url"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Note deleted" }));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = app();
    let request = Request::builder()
        .uri("/notes")
        .header(header::ORIGIN, "http://anywhere.test")
        .body(Body::empty())
        .unwrap();

    let response = raw(&app, request).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let notes = NoteService::new(Arc::new(MemoryStore::new()), BASE).unwrap();
    let app = build_router(notes, &["http://localhost:5173".to_string()]).unwrap();

    let allowed = Request::builder()
        .uri("/notes")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = raw(&app, allowed).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let denied = Request::builder()
        .uri("/notes")
        .header(header::ORIGIN, "http://evil.test")
        .body(Body::empty())
        .unwrap();
    let response = raw(&app, denied).await;
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
