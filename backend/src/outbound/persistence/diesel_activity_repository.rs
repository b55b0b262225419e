//! PostgreSQL-backed `ActivityRepository` implementation using Diesel ORM.
//!
//! Recording is an upsert on (user_id, activity_type, album_id): a
//! repeated content action replaces the earlier event's payload and
//! timestamp instead of appending a second row. Every listing orders by
//! `created_at` descending with id ascending as the tie-break, so
//! paginated reads are stable.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::ports::{ActivityRepository, ActivityRepositoryError};
use crate::domain::{ActivityEvent, ActivityKind, AlbumId, Attribution, NewActivity, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ActivityRow, NewActivityRow};
use super::pool::{DbPool, PoolError};
use super::schema::activities;

/// Diesel-backed implementation of the `ActivityRepository` port.
#[derive(Clone)]
pub struct DieselActivityRepository {
    pool: DbPool,
}

impl DieselActivityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ActivityRepositoryError {
    map_basic_pool_error(error, ActivityRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ActivityRepositoryError {
    map_basic_diesel_error(
        error,
        ActivityRepositoryError::query,
        ActivityRepositoryError::connection,
    )
}

fn row_to_event(row: ActivityRow) -> Result<ActivityEvent, ActivityRepositoryError> {
    let kind = ActivityKind::from_str(&row.activity_type)
        .map_err(|err| ActivityRepositoryError::query(format!("stored event invalid: {err}")))?;
    let album_id = AlbumId::new(row.album_id).map_err(|err| {
        ActivityRepositoryError::query(format!("stored album id invalid: {err}"))
    })?;

    Ok(ActivityEvent {
        id: row.id,
        actor: Attribution::from(row.user_id.map(UserId::from_uuid)),
        kind,
        album_id,
        payload: row.payload,
        created_at: row.created_at,
    })
}

fn rows_to_events(rows: Vec<ActivityRow>) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
    rows.into_iter().map(row_to_event).collect()
}

fn actor_ids(actors: &[UserId]) -> Vec<Option<Uuid>> {
    actors.iter().map(|actor| Some(*actor.as_uuid())).collect()
}

fn offset_to_i64(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

#[async_trait]
impl ActivityRepository for DieselActivityRepository {
    async fn record(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityEvent, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewActivityRow {
            id: Uuid::new_v4(),
            user_id: Some(*activity.actor.as_uuid()),
            activity_type: activity.kind.as_str(),
            album_id: activity.album_id.as_str(),
            payload: &activity.payload,
        };

        let row: ActivityRow = diesel::insert_into(activities::table)
            .values(&new_row)
            .on_conflict((
                activities::user_id,
                activities::activity_type,
                activities::album_id,
            ))
            .do_update()
            .set((
                activities::payload.eq(&activity.payload),
                activities::created_at.eq(Utc::now()),
            ))
            .returning(ActivityRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_event(row)
    }

    async fn list_by_actors(
        &self,
        actors: &[UserId],
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ActivityRow> = activities::table
            .filter(activities::user_id.eq_any(actor_ids(actors)))
            .order((activities::created_at.desc(), activities::id.asc()))
            .limit(i64::from(limit))
            .offset(offset_to_i64(offset))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_events(rows)
    }

    async fn count_by_actors(
        &self,
        actors: &[UserId],
    ) -> Result<u64, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = activities::table
            .filter(activities::user_id.eq_any(actor_ids(actors)))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_by_actor(
        &self,
        actor: &UserId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ActivityRow> = activities::table
            .filter(activities::user_id.eq(actor.as_uuid()))
            .order((activities::created_at.desc(), activities::id.asc()))
            .limit(i64::from(limit))
            .offset(offset_to_i64(offset))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_events(rows)
    }

    async fn count_by_actor(&self, actor: &UserId) -> Result<u64, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = activities::table
            .filter(activities::user_id.eq(actor.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_recent(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ActivityRow> = activities::table
            .order((activities::created_at.desc(), activities::id.asc()))
            .limit(i64::from(limit))
            .offset(offset_to_i64(offset))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_events(rows)
    }

    async fn list_by_kind(
        &self,
        kind: ActivityKind,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ActivityRow> = activities::table
            .filter(activities::activity_type.eq(kind.as_str()))
            .order((activities::created_at.desc(), activities::id.asc()))
            .limit(i64::from(limit))
            .offset(offset_to_i64(offset))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_events(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn sample_row(activity_type: &str) -> ActivityRow {
        ActivityRow {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            activity_type: activity_type.to_string(),
            album_id: "OK4jzGZcQ4P8C0KGrvlM".to_string(),
            payload: Value::from(4_i16),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("rating", ActivityKind::Rating)]
    #[case("review", ActivityKind::Review)]
    fn stored_kinds_round_trip(#[case] stored: &str, #[case] expected: ActivityKind) {
        let event = row_to_event(sample_row(stored)).expect("valid row");
        assert_eq!(event.kind, expected);
    }

    #[rstest]
    fn unknown_stored_kind_surfaces_as_query_error() {
        let error = row_to_event(sample_row("like")).expect_err("invalid stored kind");
        assert!(matches!(error, ActivityRepositoryError::Query { .. }));
    }

    #[rstest]
    fn actor_ids_wrap_for_the_nullable_column() {
        let actors = [UserId::random(), UserId::random()];
        let ids = actor_ids(&actors);

        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], Some(*actors[0].as_uuid()));
    }
}
