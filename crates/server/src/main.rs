//! Chirp server entry point.

use std::sync::Arc;

use axum::Router;
use chirp_api::{AppState, router as api_router};
use chirp_common::Config;
use chirp_core::{
    EngagementService, FollowService, MediaService, MessagingService, NotificationService,
    PostService, ProfileService,
};
use chirp_db::repositories::{
    BookmarkRepository, ConversationRepository, FollowRepository, MessageRepository,
    NotificationRepository, PostLikeRepository, PostRepository, ProfileRepository,
    RepostRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting chirp server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = chirp_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    chirp_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let like_repo = PostLikeRepository::new(Arc::clone(&db));
    let repost_repo = RepostRepository::new(Arc::clone(&db));
    let bookmark_repo = BookmarkRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let conversation_repo = ConversationRepository::new(Arc::clone(&db));
    let message_repo = MessageRepository::new(Arc::clone(&db));

    // Initialize services
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

    // Create app state
    let state = AppState {
        profile_service,
        follow_service,
        post_service,
        engagement_service,
        notification_service,
        messaging_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
