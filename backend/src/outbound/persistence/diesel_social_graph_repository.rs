//! PostgreSQL-backed `SocialGraphRepository` implementation using Diesel ORM.
//!
//! Edge uniqueness lives in the database: the follows table carries a
//! unique index on (follower_id, followee_id), so two concurrent follow
//! calls insert exactly one edge and the loser surfaces `DuplicateEdge`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{SocialGraphRepository, SocialGraphRepositoryError};
use crate::domain::{FollowEdge, UserId, UserProfile};

use super::diesel_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_user_repository::row_to_profile;
use super::models::{FollowRow, NewFollowRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};

/// Diesel-backed implementation of the `SocialGraphRepository` port.
#[derive(Clone)]
pub struct DieselSocialGraphRepository {
    pool: DbPool,
}

impl DieselSocialGraphRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SocialGraphRepositoryError {
    map_basic_pool_error(error, SocialGraphRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SocialGraphRepositoryError {
    map_basic_diesel_error(
        error,
        SocialGraphRepositoryError::query,
        SocialGraphRepositoryError::connection,
    )
}

/// Map an insert failure, surfacing the uniqueness constraint as the
/// duplicate-edge variant.
fn map_insert_error(error: diesel::result::Error) -> SocialGraphRepositoryError {
    if is_unique_violation(&error) {
        return SocialGraphRepositoryError::duplicate_edge();
    }
    map_diesel_error(error)
}

fn row_to_edge(row: FollowRow) -> FollowEdge {
    FollowEdge {
        id: row.id,
        follower: UserId::from_uuid(row.follower_id),
        followee: UserId::from_uuid(row.followee_id),
        created_at: row.created_at,
    }
}

fn rows_to_profiles(
    rows: Vec<ProfileRow>,
) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
    rows.into_iter()
        .map(|row| row_to_profile(row).map_err(SocialGraphRepositoryError::query))
        .collect()
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl SocialGraphRepository for DieselSocialGraphRepository {
    async fn insert_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<FollowEdge, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFollowRow {
            id: Uuid::new_v4(),
            follower_id: *follower.as_uuid(),
            followee_id: *followee.as_uuid(),
        };

        let row: FollowRow = diesel::insert_into(follows::table)
            .values(&new_row)
            .returning(FollowRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        Ok(row_to_edge(row))
    }

    async fn delete_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            follows::table.filter(
                follows::follower_id
                    .eq(follower.as_uuid())
                    .and(follows::followee_id.eq(followee.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn edge_exists(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = follows::table
            .filter(
                follows::follower_id
                    .eq(follower.as_uuid())
                    .and(follows::followee_id.eq(followee.as_uuid())),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count > 0)
    }

    async fn followers(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = follows::table
            .inner_join(users::table.on(users::id.eq(follows::follower_id)))
            .filter(follows::followee_id.eq(user.as_uuid()))
            .order(follows::created_at.desc())
            .then_order_by(follows::id.asc())
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn following(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = follows::table
            .inner_join(users::table.on(users::id.eq(follows::followee_id)))
            .filter(follows::follower_id.eq(user.as_uuid()))
            .order(follows::created_at.desc())
            .then_order_by(follows::id.asc())
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn follower_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = follows::table
            .filter(follows::followee_id.eq(user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count_to_u64(count))
    }

    async fn following_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = follows::table
            .filter(follows::follower_id.eq(user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count_to_u64(count))
    }

    async fn mutual_follows(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        let following = self.following(user).await?;
        if following.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let follower_ids: Vec<Uuid> = follows::table
            .filter(follows::followee_id.eq(user.as_uuid()))
            .select(follows::follower_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // Keep the following order so mutuals read most-recent-edge-first.
        Ok(following
            .into_iter()
            .filter(|profile| follower_ids.contains(profile.id.as_uuid()))
            .collect())
    }

    async fn follow_suggestions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let followee_ids: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq(user.as_uuid()))
            .select(follows::followee_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if followee_ids.is_empty() {
            return Ok(Vec::new());
        }

        let second_degree: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq_any(&followee_ids))
            .select(follows::followee_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut candidates: Vec<Uuid> = Vec::new();
        for id in second_degree {
            if id == *user.as_uuid() || followee_ids.contains(&id) || candidates.contains(&id) {
                continue;
            }
            candidates.push(id);
            if candidates.len() == limit as usize {
                break;
            }
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ProfileRow> = users::table
            .filter(users::id.eq_any(&candidates))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut profiles = rows_to_profiles(rows)?;

        // Preserve discovery order from the candidate walk.
        profiles.sort_by_key(|profile| {
            candidates
                .iter()
                .position(|id| id == profile.id.as_uuid())
                .unwrap_or(usize::MAX)
        });
        Ok(profiles)
    }
}
