// Integration tests for the HTTP routes, driven through the router without a socket
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hoshi_pipeline::application::services::{HashtagQueryService, HashtagService, JobPublisher};
use hoshi_pipeline::domain::entities::{HASHTAG_QUEUE, STORY_DELETION_QUEUE};
use hoshi_pipeline::domain::ports::broker::Broker;
use hoshi_pipeline::domain::ports::entity_validator::{AcceptAllValidator, EntityValidator};
use hoshi_pipeline::domain::ports::hashtag_repository::HashtagRepository;
use hoshi_pipeline::domain::ports::post_directory::PostDirectory;
use hoshi_pipeline::infrastructure::http::middleware::AppState;
use hoshi_pipeline::infrastructure::http::router::build_router;
use hoshi_pipeline::infrastructure::messaging::InMemoryBroker;
use hoshi_pipeline::infrastructure::persistence::Database;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

mod helpers;
use helpers::*;

async fn test_app(db: &Database) -> (Router, Arc<InMemoryBroker>) {
    let broker = Arc::new(InMemoryBroker::new(Duration::from_secs(60)));
    broker.declare_queue(STORY_DELETION_QUEUE).await.unwrap();
    broker.declare_queue(HASHTAG_QUEUE).await.unwrap();

    let repo = Arc::new(db.clone()) as Arc<dyn HashtagRepository>;
    let state = AppState {
        hashtag_service: HashtagService::new(
            repo.clone(),
            Arc::new(AcceptAllValidator) as Arc<dyn EntityValidator>,
        ),
        hashtag_query_service: HashtagQueryService::new(
            repo,
            Arc::new(FakePostDirectory::new()) as Arc<dyn PostDirectory>,
            Duration::from_secs(5),
        ),
        job_publisher: JobPublisher::new(broker.clone(), STORY_DELETION_QUEUE, HASHTAG_QUEUE),
    };

    (build_router(state), broker)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_tag_post_then_query() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let (app, _broker) = test_app(&db).await;

    let (status, body) = send(
        &app,
        post_json("/api/posts/1/hashtags", json!({ "hashtag_names": ["rust", "axum"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links_created"], 2);

    send(
        &app,
        post_json("/api/posts/2/hashtags", json!({ "hashtag_names": ["rust"] })),
    )
    .await;

    let (status, body) = send(&app, get("/api/hashtags/trending?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let hashtags = body["hashtags"].as_array().unwrap();
    assert_eq!(hashtags.len(), 1);
    assert_eq!(hashtags[0]["name"], "rust");
    assert_eq!(hashtags[0]["count"], 2);
    assert!(hashtags[0]["id"].is_string());

    let (status, body) = send(&app, get("/api/hashtags/rust/posts?page_size=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_post_count"], 2);
    assert_eq!(body["posts"][0]["id"], 2);
    assert_eq!(body["posts"][0]["caption"], "post 2");
}

#[tokio::test]
async fn test_invalid_query_is_bad_request() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let (app, _broker) = test_app(&db).await;

    let (status, body) = send(&app, get("/api/hashtags/trending?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/api/hashtags/rust/posts?page_offset=-3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_hashtag_search_is_empty() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let (app, _broker) = test_app(&db).await;

    let (status, body) = send(&app, get("/api/hashtags/missing/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_post_count"], 0);
    assert_eq!(body["posts"], json!([]));
}

#[tokio::test]
async fn test_story_deletion_is_queued() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let (app, broker) = test_app(&db).await;

    let (status, body) = send(&app, post_json("/api/stories/9/deletion", json!({}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message_id"].is_string());
    assert_eq!(broker.depth(STORY_DELETION_QUEUE).await, 1);

    let (status, _) = send(&app, post_json("/api/stories/0/deletion", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(broker.depth(STORY_DELETION_QUEUE).await, 1);
}

#[tokio::test]
async fn test_malformed_requests_use_error_body() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let (app, broker) = test_app(&db).await;

    let (status, body) = send(&app, get("/api/hashtags/trending?limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        post_json("/api/posts/abc/hashtags", json!({ "hashtag_names": ["rust"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let bad_json = Request::builder()
        .method("POST")
        .uri("/api/posts/1/hashtags")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, bad_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, post_json("/api/stories/nine/deletion", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(broker.depth(STORY_DELETION_QUEUE).await, 0);

    // Nothing was written by the rejected calls
    let (_, body) = send(&app, get("/api/hashtags/trending")).await;
    assert_eq!(body["hashtags"], json!([]));
}
