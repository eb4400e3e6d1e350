//! Shared application state.

#![allow(missing_docs)]

use chirp_core::{
    EngagementService, FollowService, MessagingService, NotificationService, PostService,
    ProfileService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub follow_service: FollowService,
    pub post_service: PostService,
    pub engagement_service: EngagementService,
    pub notification_service: NotificationService,
    pub messaging_service: MessagingService,
}
