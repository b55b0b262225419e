//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! Shares the upsert and anonymization shape of the rating repository:
//! one `INSERT ... ON CONFLICT (user_id, album_id) DO UPDATE` per write,
//! NULL `user_id` for anonymized rows.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{AlbumId, Attribution, Review, ReviewBody, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewRepositoryError> {
    let album_id = AlbumId::new(row.album_id)
        .map_err(|err| ReviewRepositoryError::query(format!("stored album id invalid: {err}")))?;
    let body = ReviewBody::new(row.content)
        .map_err(|err| ReviewRepositoryError::query(format!("stored review invalid: {err}")))?;

    Ok(Review {
        id: row.id,
        owner: Attribution::from(row.user_id.map(UserId::from_uuid)),
        album_id,
        body,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_reviews(rows: Vec<ReviewRow>) -> Result<Vec<Review>, ReviewRepositoryError> {
    rows.into_iter().map(row_to_review).collect()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        body: &ReviewBody,
    ) -> Result<Review, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewReviewRow {
            id: Uuid::new_v4(),
            user_id: Some(*owner.as_uuid()),
            album_id: album.as_str(),
            content: body.as_str(),
        };

        let row: ReviewRow = diesel::insert_into(reviews::table)
            .values(&new_row)
            .on_conflict((reviews::user_id, reviews::album_id))
            .do_update()
            .set((
                reviews::content.eq(body.as_str()),
                reviews::updated_at.eq(Utc::now()),
            ))
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_review(row)
    }

    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .filter(
                reviews::user_id
                    .eq(owner.as_uuid())
                    .and(reviews::album_id.eq(album.as_str())),
            )
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::user_id.eq(owner.as_uuid()))
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reviews(rows)
    }

    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::album_id.eq(album.as_str()))
            .order((reviews::created_at.asc(), reviews::id.asc()))
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reviews(rows)
    }

    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = reviews::table
            .filter(reviews::album_id.eq(album.as_str()))
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
    ) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            reviews::table.filter(
                reviews::user_id
                    .eq(owner.as_uuid())
                    .and(reviews::album_id.eq(album.as_str())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(reviews::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
