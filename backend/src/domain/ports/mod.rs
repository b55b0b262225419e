//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_purge_repository;
mod activity_repository;
mod album_catalog;
mod rating_repository;
mod review_repository;
mod session_store;
mod social_graph_repository;
mod user_repository;

#[cfg(test)]
pub use account_purge_repository::MockAccountPurgeRepository;
pub use account_purge_repository::{AccountPurgeError, AccountPurgeRepository};
#[cfg(test)]
pub use activity_repository::MockActivityRepository;
pub use activity_repository::{ActivityRepository, ActivityRepositoryError};
#[cfg(test)]
pub use album_catalog::MockAlbumCatalog;
pub use album_catalog::{AlbumCatalog, AlbumCatalogError, FixtureAlbumCatalog};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingRepository, RatingRepositoryError};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{FixtureSessionStore, SessionStore, SessionStoreError};
#[cfg(test)]
pub use social_graph_repository::MockSocialGraphRepository;
pub use social_graph_repository::{SocialGraphRepository, SocialGraphRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, UserRepository, UserRepositoryError};
