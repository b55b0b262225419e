//! Social graph domain service.
//!
//! Drives the follow-edge port while enforcing the rules the store cannot
//! express: no self-follows and no edges to unknown accounts. Duplicate
//! edges are not pre-checked here; the store's uniqueness constraint is the
//! arbiter under concurrency and its violation surfaces as
//! `AlreadyFollowing`.

use std::sync::Arc;

use crate::domain::ports::{
    SocialGraphRepository, SocialGraphRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, FollowEdge, UserId, UserProfile};

fn map_graph_error(error: SocialGraphRepositoryError) -> Error {
    match error {
        SocialGraphRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("social graph unavailable: {message}"))
        }
        SocialGraphRepositoryError::Query { message } => {
            Error::internal(format!("social graph error: {message}"))
        }
        SocialGraphRepositoryError::DuplicateEdge => Error::already_following(),
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } | UserRepositoryError::DuplicateUser { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Social graph service implementing follow, unfollow, and graph reads.
#[derive(Clone)]
pub struct SocialGraphService<G, U> {
    graph_repo: Arc<G>,
    user_repo: Arc<U>,
}

impl<G, U> SocialGraphService<G, U> {
    /// Create a new service with the graph and user repositories.
    pub const fn new(graph_repo: Arc<G>, user_repo: Arc<U>) -> Self {
        Self {
            graph_repo,
            user_repo,
        }
    }
}

impl<G, U> SocialGraphService<G, U>
where
    G: SocialGraphRepository,
    U: UserRepository,
{
    async fn require_user(&self, user: &UserId) -> Result<(), Error> {
        let exists = self.user_repo.exists(user).await.map_err(map_user_error)?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {user} not found")))
        }
    }

    /// Create a follow edge from `follower` to `followee`.
    pub async fn follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<FollowEdge, Error> {
        if follower == followee {
            return Err(Error::self_follow());
        }
        self.require_user(follower).await?;
        self.require_user(followee).await?;

        self.graph_repo
            .insert_edge(follower, followee)
            .await
            .map_err(map_graph_error)
    }

    /// Remove the follow edge from `follower` to `followee`.
    pub async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), Error> {
        let removed = self
            .graph_repo
            .delete_edge(follower, followee)
            .await
            .map_err(map_graph_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_following())
        }
    }

    /// Whether `follower` follows `followee`. Always false for a user and
    /// themselves.
    pub async fn is_following(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, Error> {
        if follower == followee {
            return Ok(false);
        }
        self.graph_repo
            .edge_exists(follower, followee)
            .await
            .map_err(map_graph_error)
    }

    /// Profiles following `user`, most-recent-edge-first.
    pub async fn followers(&self, user: &UserId) -> Result<Vec<UserProfile>, Error> {
        self.graph_repo.followers(user).await.map_err(map_graph_error)
    }

    /// Profiles `user` follows, most-recent-edge-first.
    pub async fn following(&self, user: &UserId) -> Result<Vec<UserProfile>, Error> {
        self.graph_repo.following(user).await.map_err(map_graph_error)
    }

    /// O(1) follower count; always agrees with `followers(user).len()`.
    pub async fn follower_count(&self, user: &UserId) -> Result<u64, Error> {
        self.graph_repo
            .follower_count(user)
            .await
            .map_err(map_graph_error)
    }

    /// O(1) followee count; always agrees with `following(user).len()`.
    pub async fn following_count(&self, user: &UserId) -> Result<u64, Error> {
        self.graph_repo
            .following_count(user)
            .await
            .map_err(map_graph_error)
    }

    /// Users with edges in both directions relative to `user`.
    pub async fn mutual_follows(&self, user: &UserId) -> Result<Vec<UserProfile>, Error> {
        self.graph_repo
            .mutual_follows(user)
            .await
            .map_err(map_graph_error)
    }

    /// Discovery candidates: users followed by `user`'s followees, excluding
    /// `user` and anyone already followed.
    pub async fn follow_suggestions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProfile>, Error> {
        let request = pagination::PageRequest::new(Some(limit), 0)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.graph_repo
            .follow_suggestions(user, request.limit())
            .await
            .map_err(map_graph_error)
    }
}

#[cfg(test)]
#[path = "social_graph_service_tests.rs"]
mod tests;
