//! API integration tests.
//!
//! These tests verify routing, authentication, and input validation
//! against a mock database. Paths that reach the database are covered
//! by the service tests in chirp-core.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chirp_api::{AppState, extractors::USER_ID_HEADER, router as api_router};
use chirp_common::config::{Config, ContentConfig, DatabaseConfig, MediaConfig, ServerConfig};
use chirp_core::{
    EngagementService, FollowService, MediaService, MessagingService, NotificationService,
    PostService, ProfileService,
};
use chirp_db::repositories::{
    BookmarkRepository, ConversationRepository, FollowRepository, MessageRepository,
    NotificationRepository, PostLikeRepository, PostRepository, ProfileRepository,
    RepostRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        media: MediaConfig::default(),
        content: ContentConfig::default(),
    }
}

/// Create a mock database connection.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
}

/// Create test app state with mock database.
fn create_test_state() -> AppState {
    let db = Arc::new(create_mock_db());
    let config = create_test_config();

    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let like_repo = PostLikeRepository::new(Arc::clone(&db));
    let repost_repo = RepostRepository::new(Arc::clone(&db));
    let bookmark_repo = BookmarkRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let conversation_repo = ConversationRepository::new(Arc::clone(&db));
    let message_repo = MessageRepository::new(Arc::clone(&db));

    let media = MediaService::new(&config);

    let notification_service = NotificationService::new(
        notification_repo,
        profile_repo.clone(),
        post_repo.clone(),
        media.clone(),
    );
    let profile_service = ProfileService::new(
        profile_repo.clone(),
        follow_repo.clone(),
        media.clone(),
    );
    let follow_service = FollowService::new(
        follow_repo.clone(),
        profile_repo.clone(),
        profile_service.clone(),
        notification_service.clone(),
    );
    let post_service = PostService::new(
        post_repo.clone(),
        profile_repo.clone(),
        follow_repo,
        like_repo.clone(),
        repost_repo.clone(),
        bookmark_repo.clone(),
        notification_service.clone(),
        media.clone(),
        &config,
    );
    let engagement_service = EngagementService::new(
        like_repo,
        repost_repo,
        bookmark_repo,
        post_repo,
        notification_service.clone(),
    );
    let messaging_service =
        MessagingService::new(conversation_repo, message_repo, profile_repo, media);

    AppState {
        profile_service,
        follow_service,
        post_service,
        engagement_service,
        notification_service,
        messaging_service,
    }
}

/// Create the test router.
fn create_test_router() -> Router {
    let state = create_test_state();
    api_router().with_state(state)
}

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_creation_requires_identity() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"content":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_empty_post_content_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(USER_ID_HEADER, "user1")
                .body(Body::from(r#"{"content":"   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_over_length_post_content_rejected() {
    let app = create_test_router();

    let content = "a".repeat(281);
    let body = serde_json::json!({ "content": content }).to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(USER_ID_HEADER, "user1")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_username_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profiles")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(USER_ID_HEADER, "user1")
                .body(Body::from(r#"{"username":"x!","displayName":"Test"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_follow_yourself_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/follows/user1")
                .method("POST")
                .header(USER_ID_HEADER, "user1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_search_term_returns_empty_page() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/search")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["items"], serde_json::json!([]));
    assert_eq!(body["data"]["hasMore"], serde_json::json!(false));
}

#[tokio::test]
async fn test_anonymous_notifications_list_is_empty() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["items"], serde_json::json!([]));
}

#[tokio::test]
async fn test_anonymous_unread_count_is_zero() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications/unread-count")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["count"], serde_json::json!(0));
}

#[tokio::test]
async fn test_anonymous_bookmarks_list_is_empty() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/bookmarks")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["items"], serde_json::json!([]));
}

#[tokio::test]
async fn test_anonymous_conversations_list_is_empty() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/conversations")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_conversation_with_yourself_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/conversations")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(USER_ID_HEADER, "user1")
                .body(Body::from(r#"{"otherUserId":"user1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_message_content_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/conversations/c1/messages")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(USER_ID_HEADER, "user1")
                .body(Body::from(r#"{"content":"  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_notification_requires_identity() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications/n1")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_requires_identity() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1/like")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
