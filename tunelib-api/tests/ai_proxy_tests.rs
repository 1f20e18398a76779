//! Integration tests for the AI proxy endpoints
//!
//! A throwaway axum server on 127.0.0.1:0 stands in for the AI service.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use tunelib_api::services::AiClient;
use tunelib_api::{build_router, AppState};
use tunelib_common::Database;

/// Serve `upstream` on an ephemeral port and return its base URL
async fn spawn_upstream(upstream: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn setup_app(ai_base_url: &str, timeout: Duration) -> Router {
    let db = Database::in_memory().await.unwrap();
    let ai = AiClient::new(ai_base_url, timeout).unwrap();
    build_router(AppState::new(db, ai, vec![]))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn songs() -> Value {
    json!([
        {
            "id": "3f0e7c1e-8a4b-4c6d-9e2f-1a2b3c4d5e6f",
            "title": "Harder Better",
            "artist": "Daft Punk",
            "genre": "House",
            "year": 2001,
            "duration": 224
        },
        {
            "id": "7a1d2c3b-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
            "title": "Kelly Watch the Stars",
            "artist": "Air",
            "album": null,
            "duration": 225
        }
    ])
}

/// Upstream that answers every endpoint with a canned payload built from the
/// forwarded body
fn echo_upstream() -> Router {
    Router::new()
        .route(
            "/describe-playlist",
            post(|Json(body): Json<Value>| async move {
                let count = body["songs"].as_array().map_or(0, |s| s.len());
                Json(json!({ "description": format!("{} songs of late-night groove", count) }))
            }),
        )
        .route(
            "/recommend-songs",
            post(|Json(body): Json<Value>| async move {
                let n = body["number_of_recommendations"].as_u64().unwrap_or(0);
                let recommendations: Vec<Value> = (0..n)
                    .map(|i| json!({"title": format!("Pick {}", i), "artist": "Someone", "reason": "similar tempo"}))
                    .collect();
                Json(json!({ "recommendations": recommendations }))
            }),
        )
        .route(
            "/generate-name",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "names": [format!("{} mix", body["style"].as_str().unwrap_or("?"))] }))
            }),
        )
        .route(
            "/analyze-mood",
            post(|| async { Json(json!({ "moods": ["upbeat", "warm"], "description": "Sunny" })) }),
        )
        .route(
            "/semantic-search",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "songs": [],
                    "explanation": format!("{} / {}", body["query"].as_str().unwrap_or(""), body["limit"])
                }))
            }),
        )
}

#[tokio::test]
async fn test_describe_playlist_forwards_songs() {
    let base = spawn_upstream(echo_upstream()).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/describe-playlist", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "2 songs of late-night groove");
}

#[tokio::test]
async fn test_recommend_songs() {
    let base = spawn_upstream(echo_upstream()).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request(
            "/api/v1/ai/recommend-songs",
            json!({ "current_songs": songs(), "number_of_recommendations": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
    assert_eq!(body["recommendations"][0]["reason"], "similar tempo");
}

#[tokio::test]
async fn test_generate_playlist_name_uses_generate_name_path() {
    let base = spawn_upstream(echo_upstream()).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request(
            "/api/v1/ai/generate-playlist-name",
            json!({ "songs": songs(), "style": "fun" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["names"], json!(["fun mix"]));
}

#[tokio::test]
async fn test_analyze_mood() {
    let base = spawn_upstream(echo_upstream()).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/analyze-mood", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moods"], json!(["upbeat", "warm"]));
    assert_eq!(body["description"], "Sunny");
}

#[tokio::test]
async fn test_semantic_search_default_limit() {
    let base = spawn_upstream(echo_upstream()).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/semantic-search", json!({ "query": "rainy day" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["explanation"], "rainy day / 10");
    assert_eq!(body["songs"], json!([]));
}

#[tokio::test]
async fn test_invalid_requests_never_reach_upstream() {
    // Unroutable base URL: a validation failure must answer first
    let app = setup_app("http://127.0.0.1:9", Duration::from_secs(1)).await;

    let cases = [
        ("/api/v1/ai/describe-playlist", json!({ "songs": [] })),
        (
            "/api/v1/ai/recommend-songs",
            json!({ "current_songs": songs(), "number_of_recommendations": 51 }),
        ),
        (
            "/api/v1/ai/generate-playlist-name",
            json!({ "songs": songs(), "style": "moody" }),
        ),
        ("/api/v1/ai/semantic-search", json!({ "query": "" })),
        (
            "/api/v1/ai/analyze-mood",
            json!({ "songs": [{ "id": "nope", "title": "t", "artist": "a", "duration": 1 }] }),
        ),
    ];
    for (uri, body) in cases {
        let (status, response) = send(app.clone(), json_request(uri, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", uri, response);
        assert_eq!(response["success"], false);
    }
}

#[tokio::test]
async fn test_upstream_server_error_maps_to_bad_gateway() {
    let upstream = Router::new().route(
        "/describe-playlist",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "model exploded" })),
            )
        }),
    );
    let base = spawn_upstream(upstream).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/describe-playlist", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "AI API error: model exploded");
}

#[tokio::test]
async fn test_upstream_client_error_keeps_status() {
    let upstream = Router::new().route(
        "/analyze-mood",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "songs look odd") }),
    );
    let base = spawn_upstream(upstream).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/analyze-mood", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "AI API error: songs look odd");
}

#[tokio::test]
async fn test_upstream_reply_is_relayed_untouched() {
    let upstream = Router::new()
        .route(
            "/describe-playlist",
            post(|| async {
                Json(json!({ "description": "x", "confidence": 0.9, "tags": ["a"] }))
            }),
        )
        .route(
            "/recommend-songs",
            post(|| async {
                Json(json!({ "recommendations": [{ "title": "Intro", "artist": "The xx" }] }))
            }),
        );
    let base = spawn_upstream(upstream).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app.clone(),
        json_request("/api/v1/ai/describe-playlist", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "description": "x", "confidence": 0.9, "tags": ["a"] })
    );

    // A recommendation without a reason is still valid JSON
    let (status, body) = send(
        app,
        json_request(
            "/api/v1/ai/recommend-songs",
            json!({ "current_songs": songs(), "number_of_recommendations": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"][0]["artist"], "The xx");
    assert!(body["recommendations"][0].get("reason").is_none());
}

#[tokio::test]
async fn test_unparsable_success_body_is_bad_gateway() {
    let upstream = Router::new().route("/analyze-mood", post(|| async { "definitely not json" }));
    let base = spawn_upstream(upstream).await;
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/analyze-mood", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("AI API returned invalid JSON response:"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_service_unavailable() {
    // Reserve a port, then free it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let app = setup_app(&base, Duration::from_secs(5)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/describe-playlist", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"],
        format!("AI API service unavailable. Could not connect to {}", base)
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = Router::new().route(
        "/describe-playlist",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "description": "too late" }))
        }),
    );
    let base = spawn_upstream(upstream).await;
    let app = setup_app(&base, Duration::from_millis(200)).await;

    let (status, body) = send(
        app,
        json_request("/api/v1/ai/describe-playlist", json!({ "songs": songs() })),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        body["error"],
        "AI API request timeout. The service took too long to respond."
    );
}
