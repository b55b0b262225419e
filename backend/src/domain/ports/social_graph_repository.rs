//! Port for the directed follow graph.

use async_trait::async_trait;

use crate::domain::{FollowEdge, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by social graph adapters.
    pub enum SocialGraphRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "social graph repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "social graph repository query failed: {message}",
        /// The ordered (follower, followee) pair already has an edge.
        ///
        /// Surfaced from the database uniqueness constraint, so two
        /// concurrent follows leave exactly one edge and the loser sees
        /// this variant.
        DuplicateEdge =>
            "follow edge already exists",
    }
}

/// Port for follow edge storage and graph reads.
///
/// Uniqueness of the ordered (follower, followee) pair is enforced by the
/// backing store, not by a check-then-insert in the adapter; `insert_edge`
/// reports a race loser via [`SocialGraphRepositoryError::DuplicateEdge`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraphRepository: Send + Sync {
    /// Create the directed edge and return it.
    async fn insert_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<FollowEdge, SocialGraphRepositoryError>;

    /// Remove the directed edge. Returns `false` when no edge existed.
    async fn delete_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError>;

    /// Whether the directed edge exists.
    async fn edge_exists(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError>;

    /// Profiles following `user`, most-recent-edge-first.
    async fn followers(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError>;

    /// Profiles `user` follows, most-recent-edge-first.
    async fn following(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError>;

    /// Count of followers; must always equal `followers(user).len()`.
    async fn follower_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError>;

    /// Count of followees; must always equal `following(user).len()`.
    async fn following_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError>;

    /// Profiles with edges in both directions relative to `user`.
    async fn mutual_follows(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError>;

    /// Profiles followed by `user`'s followees, excluding `user` and anyone
    /// already followed. No ranking beyond that exclusion is defined.
    async fn follow_suggestions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError>;
}
