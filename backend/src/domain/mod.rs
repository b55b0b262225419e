//! Domain entities, value types, services, and ports.
//!
//! Types here are transport and storage agnostic. Validation happens in the
//! constructors so that a value of one of these types is always well formed;
//! adapters convert to and from rows at the persistence boundary.

pub mod ports;

mod account_deletion_service;
mod activity;
mod activity_feed_service;
mod content;
mod content_service;
mod deletion;
mod error;
mod social_graph_service;
mod user;

pub use self::account_deletion_service::AccountDeletionService;
pub use self::activity::{ActivityEvent, ActivityKind, NewActivity};
pub use self::activity_feed_service::ActivityFeedService;
pub use self::content::{
    AlbumId, Attribution, ContentValidationError, Rating, RatingValue, Review, ReviewBody,
    REVIEW_BODY_MAX,
};
pub use self::content_service::ContentService;
pub use self::deletion::DeletionAudit;
pub use self::error::{Error, ErrorCode};
pub use self::social_graph_service::SocialGraphService;
pub use self::user::{
    CredentialHash, EmailAddress, FollowEdge, User, UserId, UserProfile, UserValidationError,
    Username,
};
