//! PostgreSQL-backed `RatingRepository` implementation using Diesel ORM.
//!
//! The upsert is a single `INSERT ... ON CONFLICT (user_id, album_id) DO
//! UPDATE`, so concurrent upserts on the same pair converge to one row
//! and both callers observe success. Anonymized rows have a NULL
//! `user_id`; PostgreSQL treats NULLs as distinct in the unique index, so
//! only owned rows participate in the conflict target.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RatingRepository, RatingRepositoryError};
use crate::domain::{AlbumId, Attribution, Rating, RatingValue, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRatingRow, RatingRow};
use super::pool::{DbPool, PoolError};
use super::schema::ratings;

/// Diesel-backed implementation of the `RatingRepository` port.
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RatingRepositoryError {
    map_basic_pool_error(error, RatingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RatingRepositoryError {
    map_basic_diesel_error(
        error,
        RatingRepositoryError::query,
        RatingRepositoryError::connection,
    )
}

fn row_to_rating(row: RatingRow) -> Result<Rating, RatingRepositoryError> {
    let album_id = AlbumId::new(row.album_id)
        .map_err(|err| RatingRepositoryError::query(format!("stored album id invalid: {err}")))?;
    let value = RatingValue::new(row.rating)
        .map_err(|err| RatingRepositoryError::query(format!("stored rating invalid: {err}")))?;

    Ok(Rating {
        id: row.id,
        owner: Attribution::from(row.user_id.map(UserId::from_uuid)),
        album_id,
        value,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_ratings(rows: Vec<RatingRow>) -> Result<Vec<Rating>, RatingRepositoryError> {
    rows.into_iter().map(row_to_rating).collect()
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        value: RatingValue,
    ) -> Result<Rating, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRatingRow {
            id: Uuid::new_v4(),
            user_id: Some(*owner.as_uuid()),
            album_id: album.as_str(),
            rating: value.get(),
        };

        let row: RatingRow = diesel::insert_into(ratings::table)
            .values(&new_row)
            .on_conflict((ratings::user_id, ratings::album_id))
            .do_update()
            .set((
                ratings::rating.eq(value.get()),
                ratings::updated_at.eq(Utc::now()),
            ))
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_rating(row)
    }

    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RatingRow> = ratings::table
            .filter(
                ratings::user_id
                    .eq(owner.as_uuid())
                    .and(ratings::album_id.eq(album.as_str())),
            )
            .select(RatingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_rating).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RatingRow> = ratings::table
            .find(id)
            .select(RatingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_rating).transpose()
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RatingRow> = ratings::table
            .filter(ratings::user_id.eq(owner.as_uuid()))
            .order((ratings::created_at.desc(), ratings::id.asc()))
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_ratings(rows)
    }

    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RatingRow> = ratings::table
            .filter(ratings::album_id.eq(album.as_str()))
            .order((ratings::created_at.asc(), ratings::id.asc()))
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_ratings(rows)
    }

    async fn average_for_album(
        &self,
        album: &AlbumId,
    ) -> Result<Option<f64>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let values: Vec<i16> = ratings::table
            .filter(ratings::album_id.eq(album.as_str()))
            .select(ratings::rating)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if values.is_empty() {
            return Ok(None);
        }
        let sum: f64 = values.iter().map(|value| f64::from(*value)).sum();
        let mean = sum / values.len() as f64;
        Ok(Some(mean))
    }

    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = ratings::table
            .filter(ratings::album_id.eq(album.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn delete(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<bool, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            ratings::table.filter(
                ratings::user_id
                    .eq(owner.as_uuid())
                    .and(ratings::album_id.eq(album.as_str())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(ratings::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.
    use super::*;
    use rstest::rstest;

    fn sample_row(user_id: Option<Uuid>, rating: i16) -> RatingRow {
        let now = Utc::now();
        RatingRow {
            id: Uuid::new_v4(),
            user_id,
            album_id: "OK4jzGZcQ4P8C0KGrvlM".to_string(),
            rating,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn owned_rows_convert_with_user_attribution() {
        let owner = Uuid::new_v4();
        let rating = row_to_rating(sample_row(Some(owner), 4)).expect("valid row");

        assert_eq!(rating.owner.user_id(), Some(&UserId::from_uuid(owner)));
        assert_eq!(rating.value.get(), 4);
    }

    #[rstest]
    fn null_owner_converts_to_anonymized_attribution() {
        let rating = row_to_rating(sample_row(None, 5)).expect("valid row");
        assert!(rating.owner.is_anonymized());
    }

    #[rstest]
    fn out_of_range_stored_values_surface_as_query_errors() {
        let error = row_to_rating(sample_row(Some(Uuid::new_v4()), 9))
            .expect_err("invalid stored value");
        assert!(matches!(error, RatingRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, RatingRepositoryError::Connection { .. }));
    }
}
