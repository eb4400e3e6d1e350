//! API endpoints.

mod engagement;
mod follows;
mod hashtags;
mod messaging;
mod notifications;
mod posts;
mod profiles;
mod users;

use axum::Router;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/profiles", profiles::router())
        .nest("/users", users::router())
        .nest("/follows", follows::router())
        .nest("/posts", posts::router().merge(engagement::router()))
        .nest("/bookmarks", engagement::bookmarks_router())
        .nest("/hashtags", hashtags::router())
        .nest("/notifications", notifications::router())
        .nest("/conversations", messaging::router())
        .nest("/messages", messaging::messages_router())
}
