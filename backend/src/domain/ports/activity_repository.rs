//! Port for the activity log backing the feeds.

use async_trait::async_trait;

use crate::domain::{ActivityEvent, ActivityKind, NewActivity, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by activity log adapters.
    pub enum ActivityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "activity repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "activity repository query failed: {message}",
    }
}

/// Port for activity event storage and feed reads.
///
/// Every listing is ordered newest-first by `created_at` with ties broken
/// by id ascending, so repeated paginated reads are stable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Record an accepted content action.
    ///
    /// Upserts on (actor, kind, album): re-rating an album replaces the
    /// previous event's payload and timestamp rather than appending a
    /// second event.
    async fn record(&self, activity: &NewActivity)
        -> Result<ActivityEvent, ActivityRepositoryError>;

    /// Events whose actor is any of `actors`, newest-first.
    async fn list_by_actors(
        &self,
        actors: &[UserId],
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError>;

    /// Exact count of events whose actor is any of `actors`.
    async fn count_by_actors(&self, actors: &[UserId])
        -> Result<u64, ActivityRepositoryError>;

    /// One actor's events, newest-first.
    async fn list_by_actor(
        &self,
        actor: &UserId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError>;

    /// Exact count of one actor's events.
    async fn count_by_actor(&self, actor: &UserId) -> Result<u64, ActivityRepositoryError>;

    /// Global events across all users, newest-first.
    async fn list_recent(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError>;

    /// Global events of one kind, newest-first.
    async fn list_by_kind(
        &self,
        kind: ActivityKind,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError>;
}
