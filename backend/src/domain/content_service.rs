//! Ratings and reviews domain service.
//!
//! Validation runs before any storage is touched, so a rejected upsert has
//! no side effects. Accepted upserts record an activity event for the
//! (actor, kind, album) triple; a changed rating replaces the previous
//! event rather than appending a second one.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{
    ActivityRepository, ActivityRepositoryError, AlbumCatalog, AlbumCatalogError,
    RatingRepository, RatingRepositoryError, ReviewRepository, ReviewRepositoryError,
};
use crate::domain::{
    ActivityKind, AlbumId, Error, NewActivity, Rating, RatingValue, Review, ReviewBody, UserId,
};

fn map_rating_error(error: RatingRepositoryError) -> Error {
    match error {
        RatingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rating repository unavailable: {message}"))
        }
        RatingRepositoryError::Query { message } => {
            Error::internal(format!("rating repository error: {message}"))
        }
    }
}

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
    }
}

fn map_activity_error(error: ActivityRepositoryError) -> Error {
    match error {
        ActivityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("activity log unavailable: {message}"))
        }
        ActivityRepositoryError::Query { message } => {
            Error::internal(format!("activity log error: {message}"))
        }
    }
}

fn map_catalog_error(error: AlbumCatalogError) -> Error {
    match error {
        AlbumCatalogError::Unavailable { message } => {
            Error::service_unavailable(format!("album catalog unavailable: {message}"))
        }
    }
}

/// Round an arithmetic mean to two decimal places for display parity with
/// stored averages.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ratings and reviews service.
#[derive(Clone)]
pub struct ContentService<R, V, A, C> {
    rating_repo: Arc<R>,
    review_repo: Arc<V>,
    activity_repo: Arc<A>,
    catalog: Arc<C>,
}

impl<R, V, A, C> ContentService<R, V, A, C> {
    /// Create a new service with the content repositories and the catalog
    /// collaborator.
    pub const fn new(
        rating_repo: Arc<R>,
        review_repo: Arc<V>,
        activity_repo: Arc<A>,
        catalog: Arc<C>,
    ) -> Self {
        Self {
            rating_repo,
            review_repo,
            activity_repo,
            catalog,
        }
    }
}

impl<R, V, A, C> ContentService<R, V, A, C>
where
    R: RatingRepository,
    V: ReviewRepository,
    A: ActivityRepository,
    C: AlbumCatalog,
{
    async fn require_album(&self, album: &AlbumId) -> Result<(), Error> {
        let exists = self
            .catalog
            .album_exists(album)
            .await
            .map_err(map_catalog_error)?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("album {album} not found in catalog")))
        }
    }

    async fn record_activity(
        &self,
        actor: &UserId,
        kind: ActivityKind,
        album: &AlbumId,
        payload: Value,
    ) -> Result<(), Error> {
        self.activity_repo
            .record(&NewActivity {
                actor: *actor,
                kind,
                album_id: album.clone(),
                payload,
            })
            .await
            .map_err(map_activity_error)?;
        Ok(())
    }

    /// Create or update `owner`'s rating of `album`.
    ///
    /// The raw integer is validated first; a bad value fails without side
    /// effects. Re-rating updates the row in place (same id, `created_at`
    /// unchanged, `updated_at` advanced) and replaces the feed event.
    pub async fn rate_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
        value: i16,
    ) -> Result<Rating, Error> {
        let value =
            RatingValue::new(value).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.require_album(album).await?;

        let rating = self
            .rating_repo
            .upsert(owner, album, value)
            .await
            .map_err(map_rating_error)?;

        self.record_activity(
            owner,
            ActivityKind::Rating,
            album,
            Value::from(value.get()),
        )
        .await?;

        Ok(rating)
    }

    /// Create or update `owner`'s review of `album`.
    ///
    /// Content that trims to empty (or exceeds the length bound) fails
    /// before any write; stored content is the trimmed text.
    pub async fn review_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
        body: impl Into<String> + Send,
    ) -> Result<Review, Error> {
        let body =
            ReviewBody::new(body).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.require_album(album).await?;

        let review = self
            .review_repo
            .upsert(owner, album, &body)
            .await
            .map_err(map_review_error)?;

        self.record_activity(
            owner,
            ActivityKind::Review,
            album,
            Value::from(body.as_str()),
        )
        .await?;

        Ok(review)
    }

    /// The owner's rating of an album, when present.
    pub async fn rating_of(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Rating>, Error> {
        self.rating_repo
            .find_by_owner_and_album(owner, album)
            .await
            .map_err(map_rating_error)
    }

    /// Look up a rating by row id.
    pub async fn rating_by_id(&self, id: Uuid) -> Result<Rating, Error> {
        self.rating_repo
            .find_by_id(id)
            .await
            .map_err(map_rating_error)?
            .ok_or_else(|| Error::not_found(format!("rating {id} not found")))
    }

    /// The owner's review of an album, when present.
    pub async fn review_of(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Review>, Error> {
        self.review_repo
            .find_by_owner_and_album(owner, album)
            .await
            .map_err(map_review_error)
    }

    /// Look up a review by row id.
    pub async fn review_by_id(&self, id: Uuid) -> Result<Review, Error> {
        self.review_repo
            .find_by_id(id)
            .await
            .map_err(map_review_error)?
            .ok_or_else(|| Error::not_found(format!("review {id} not found")))
    }

    /// All of an owner's ratings, newest-first.
    pub async fn ratings_by_owner(&self, owner: &UserId) -> Result<Vec<Rating>, Error> {
        self.rating_repo
            .list_by_owner(owner)
            .await
            .map_err(map_rating_error)
    }

    /// All of an owner's reviews, newest-first.
    pub async fn reviews_by_owner(&self, owner: &UserId) -> Result<Vec<Review>, Error> {
        self.review_repo
            .list_by_owner(owner)
            .await
            .map_err(map_review_error)
    }

    /// All ratings of an album, oldest-first.
    pub async fn ratings_for_album(&self, album: &AlbumId) -> Result<Vec<Rating>, Error> {
        self.rating_repo
            .list_by_album(album)
            .await
            .map_err(map_rating_error)
    }

    /// All reviews of an album, oldest-first.
    pub async fn reviews_for_album(&self, album: &AlbumId) -> Result<Vec<Review>, Error> {
        self.review_repo
            .list_by_album(album)
            .await
            .map_err(map_review_error)
    }

    /// Mean of the album's current rating values rounded to two decimal
    /// places; 0 for an unrated album. Anonymized rows contribute, so an
    /// account deletion never moves an average.
    pub async fn average_rating(&self, album: &AlbumId) -> Result<f64, Error> {
        let average = self
            .rating_repo
            .average_for_album(album)
            .await
            .map_err(map_rating_error)?;
        Ok(average.map_or(0.0, round_half_up))
    }

    /// Count of rating rows for the album, anonymized rows included.
    pub async fn rating_count(&self, album: &AlbumId) -> Result<u64, Error> {
        self.rating_repo
            .count_for_album(album)
            .await
            .map_err(map_rating_error)
    }

    /// Count of review rows for the album, anonymized rows included.
    pub async fn review_count(&self, album: &AlbumId) -> Result<u64, Error> {
        self.review_repo
            .count_for_album(album)
            .await
            .map_err(map_review_error)
    }

    /// Hard-delete the owner's rating; user-initiated, distinct from the
    /// anonymization path of account deletion.
    pub async fn delete_rating(&self, owner: &UserId, album: &AlbumId) -> Result<(), Error> {
        let removed = self
            .rating_repo
            .delete(owner, album)
            .await
            .map_err(map_rating_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("rating for album {album} not found")))
        }
    }

    /// Hard-delete a rating by row id.
    pub async fn delete_rating_by_id(&self, id: Uuid) -> Result<(), Error> {
        let removed = self
            .rating_repo
            .delete_by_id(id)
            .await
            .map_err(map_rating_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("rating {id} not found")))
        }
    }

    /// Hard-delete the owner's review.
    pub async fn delete_review(&self, owner: &UserId, album: &AlbumId) -> Result<(), Error> {
        let removed = self
            .review_repo
            .delete(owner, album)
            .await
            .map_err(map_review_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("review for album {album} not found")))
        }
    }

    /// Hard-delete a review by row id.
    pub async fn delete_review_by_id(&self, id: Uuid) -> Result<(), Error> {
        let removed = self
            .review_repo
            .delete_by_id(id)
            .await
            .map_err(map_review_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("review {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "content_service_tests.rs"]
mod tests;
