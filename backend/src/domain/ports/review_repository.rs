//! Port for review persistence with upsert semantics.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AlbumId, Review, ReviewBody, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
    }
}

/// Port for review storage; shares the (owner, album) upsert contract with
/// the rating repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert or update the review for (owner, album).
    ///
    /// An existing row keeps its id and `created_at`; `updated_at` advances
    /// on every call, including a repeat of identical content.
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        body: &ReviewBody,
    ) -> Result<Review, ReviewRepositoryError>;

    /// The owner's review of an album, when present.
    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Look up a review by row id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ReviewRepositoryError>;

    /// All reviews by an owner, newest-first (the owner's activity history).
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// All reviews of an album, oldest-first (chronological display),
    /// anonymized rows included.
    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Count of review rows for the album, anonymized rows included.
    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, ReviewRepositoryError>;

    /// Hard-delete the owner's review. Returns `false` when absent.
    async fn delete(&self, owner: &UserId, album: &AlbumId)
        -> Result<bool, ReviewRepositoryError>;

    /// Hard-delete by row id. Returns `false` when absent.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ReviewRepositoryError>;
}
