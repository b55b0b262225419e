//! Activity feed assembly and pagination.
//!
//! Stateless query composition over the social graph and the activity log.
//! The personalised feed resolves followees first and returns an empty
//! result without touching the activity log when there are none; a user
//! following no one must see zero events and the engine must not issue a
//! broad scan to discover that.

use std::str::FromStr;
use std::sync::Arc;

use pagination::{Page, PageRequest};

use crate::domain::ports::{
    ActivityRepository, ActivityRepositoryError, SocialGraphRepository,
    SocialGraphRepositoryError,
};
use crate::domain::{ActivityEvent, ActivityKind, Error, UserId};

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

fn map_graph_error(error: SocialGraphRepositoryError) -> Error {
    match error {
        SocialGraphRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("social graph unavailable: {message}"))
        }
        SocialGraphRepositoryError::Query { message } => {
            Error::internal(format!("social graph error: {message}"))
        }
        SocialGraphRepositoryError::DuplicateEdge => {
            Error::internal("unexpected duplicate edge during feed read")
        }
    }
}

fn page_request(page: u32, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::from_page(page, limit).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Feed read service over the graph and activity log.
#[derive(Clone)]
pub struct ActivityFeedService<G, A> {
    graph_repo: Arc<G>,
    activity_repo: Arc<A>,
}

impl<G, A> ActivityFeedService<G, A> {
    /// Create a new service with the graph and activity repositories.
    pub const fn new(graph_repo: Arc<G>, activity_repo: Arc<A>) -> Self {
        Self {
            graph_repo,
            activity_repo,
        }
    }
}

impl<G, A> ActivityFeedService<G, A>
where
    G: SocialGraphRepository,
    A: ActivityRepository,
{
    async fn followee_ids(&self, user: &UserId) -> Result<Vec<UserId>, Error> {
        let following = self
            .graph_repo
            .following(user)
            .await
            .map_err(map_graph_error)?;
        Ok(following.into_iter().map(|profile| profile.id).collect())
    }

    /// Chronological feed of the users `user` follows, newest-first.
    pub async fn feed(
        &self,
        user: &UserId,
        request: PageRequest,
    ) -> Result<Vec<ActivityEvent>, Error> {
        let followees = self.followee_ids(user).await?;
        if followees.is_empty() {
            return Ok(Vec::new());
        }
        self.activity_repo
            .list_by_actors(&followees, request.limit(), request.offset())
            .await
            .map_err(map_activity_error)
    }

    /// Personalised feed with a pagination envelope carrying the exact
    /// total and `has_more = page * limit < total`.
    pub async fn feed_page(
        &self,
        user: &UserId,
        page: u32,
        limit: Option<u32>,
    ) -> Result<Page<ActivityEvent>, Error> {
        let request = page_request(page, limit)?;
        let followees = self.followee_ids(user).await?;
        if followees.is_empty() {
            return Ok(Page::empty(&request));
        }

        let items = self
            .activity_repo
            .list_by_actors(&followees, request.limit(), request.offset())
            .await
            .map_err(map_activity_error)?;
        let total = self
            .activity_repo
            .count_by_actors(&followees)
            .await
            .map_err(map_activity_error)?;

        Ok(Page::new(items, &request, total))
    }

    /// A user's own events, independent of the follow graph; drives public
    /// profile pages.
    pub async fn user_feed(
        &self,
        user: &UserId,
        request: PageRequest,
    ) -> Result<Vec<ActivityEvent>, Error> {
        self.activity_repo
            .list_by_actor(user, request.limit(), request.offset())
            .await
            .map_err(map_activity_error)
    }

    /// A user's own events with a pagination envelope.
    pub async fn user_feed_page(
        &self,
        user: &UserId,
        page: u32,
        limit: Option<u32>,
    ) -> Result<Page<ActivityEvent>, Error> {
        let request = page_request(page, limit)?;
        let items = self
            .activity_repo
            .list_by_actor(user, request.limit(), request.offset())
            .await
            .map_err(map_activity_error)?;
        let total = self
            .activity_repo
            .count_by_actor(user)
            .await
            .map_err(map_activity_error)?;
        Ok(Page::new(items, &request, total))
    }

    /// Global discovery feed across all users, newest-first.
    pub async fn recent(&self, request: PageRequest) -> Result<Vec<ActivityEvent>, Error> {
        self.activity_repo
            .list_recent(request.limit(), request.offset())
            .await
            .map_err(map_activity_error)
    }

    /// Global feed filtered to one kind; any filter string other than
    /// `rating` or `review` is rejected.
    pub async fn by_kind(
        &self,
        kind_filter: &str,
        request: PageRequest,
    ) -> Result<Vec<ActivityEvent>, Error> {
        let kind = ActivityKind::from_str(kind_filter)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.activity_repo
            .list_by_kind(kind, request.limit(), request.offset())
            .await
            .map_err(map_activity_error)
    }

    /// Exact count of a user's own events.
    pub async fn user_activity_count(&self, user: &UserId) -> Result<u64, Error> {
        self.activity_repo
            .count_by_actor(user)
            .await
            .map_err(map_activity_error)
    }

    /// Whether the user has any events; exactly `user_activity_count > 0`,
    /// with no separate source of truth.
    pub async fn has_activities(&self, user: &UserId) -> Result<bool, Error> {
        Ok(self.user_activity_count(user).await? > 0)
    }
}

#[cfg(test)]
#[path = "activity_feed_service_tests.rs"]
mod tests;
