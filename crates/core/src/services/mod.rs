//! Business logic services.

pub mod engagement;
pub mod follow;
pub mod media;
pub mod messaging;
pub mod notification;
pub mod post;
pub mod profile;

pub use engagement::EngagementService;
pub use follow::FollowService;
pub use media::MediaService;
pub use messaging::{ConversationSummary, EnrichedMessage, MessagingService};
pub use notification::{EnrichedNotification, NotificationService};
pub use post::{CreatePostInput, EnrichedPost, PostService, TrendingHashtag};
pub use profile::{
    CreateProfileInput, EnrichedProfile, ProfileCard, ProfileService, UpdateProfileInput,
};
