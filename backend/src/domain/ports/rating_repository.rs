//! Port for rating persistence with upsert semantics.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AlbumId, Rating, RatingValue, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "rating repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "rating repository query failed: {message}",
    }
}

/// Port for rating storage.
///
/// `upsert` is atomic insert-on-conflict-update on (owner, album): a race
/// between two upserts on the same pair converges to one row holding the
/// later committed value, and both callers observe success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or update the rating for (owner, album).
    ///
    /// An existing row keeps its id and `created_at`; `updated_at` advances
    /// on every call, including a repeat of the same value.
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        value: RatingValue,
    ) -> Result<Rating, RatingRepositoryError>;

    /// The owner's rating of an album, when present.
    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Rating>, RatingRepositoryError>;

    /// Look up a rating by row id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RatingRepositoryError>;

    /// All ratings by an owner, newest-first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Rating>, RatingRepositoryError>;

    /// All ratings of an album, oldest-first, anonymized rows included.
    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Rating>, RatingRepositoryError>;

    /// Mean of the album's current rating values, or `None` when unrated.
    /// Anonymized rows contribute; anonymization never moves an average.
    async fn average_for_album(
        &self,
        album: &AlbumId,
    ) -> Result<Option<f64>, RatingRepositoryError>;

    /// Count of rating rows for the album, anonymized rows included.
    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, RatingRepositoryError>;

    /// Hard-delete the owner's rating. Returns `false` when absent.
    async fn delete(&self, owner: &UserId, album: &AlbumId)
        -> Result<bool, RatingRepositoryError>;

    /// Hard-delete by row id. Returns `false` when absent.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RatingRepositoryError>;
}
