//! Tests for the social graph service.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    MockSocialGraphRepository, MockUserRepository, SocialGraphRepositoryError,
};
use crate::domain::{ErrorCode, Username};

fn profile(name: &str) -> UserProfile {
    UserProfile {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
    }
}

fn edge(follower: UserId, followee: UserId) -> FollowEdge {
    FollowEdge {
        id: Uuid::new_v4(),
        follower,
        followee,
        created_at: Utc::now(),
    }
}

fn users_that_exist() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_exists().returning(|_| Ok(true));
    users
}

#[tokio::test]
async fn follow_creates_the_edge() {
    let follower = UserId::random();
    let followee = UserId::random();
    let expected = edge(follower, followee);

    let mut graph = MockSocialGraphRepository::new();
    let returned = expected.clone();
    graph
        .expect_insert_edge()
        .times(1)
        .return_once(move |_, _| Ok(returned));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let created = service
        .follow(&follower, &followee)
        .await
        .expect("follow succeeds");

    assert_eq!(created, expected);
}

#[tokio::test]
async fn follow_rejects_self_follow_without_touching_storage() {
    let user = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph.expect_insert_edge().times(0);
    let mut users = MockUserRepository::new();
    users.expect_exists().times(0);

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users));
    let error = service.follow(&user, &user).await.expect_err("self follow");

    assert_eq!(error.code(), ErrorCode::SelfFollow);
    assert_eq!(error.message(), "users cannot follow themselves");
}

#[tokio::test]
async fn follow_rejects_unknown_users() {
    let follower = UserId::random();
    let followee = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph.expect_insert_edge().times(0);
    let mut users = MockUserRepository::new();
    users.expect_exists().returning(|_| Ok(false));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users));
    let error = service
        .follow(&follower, &followee)
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn duplicate_edge_surfaces_as_already_following() {
    let follower = UserId::random();
    let followee = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph
        .expect_insert_edge()
        .times(1)
        .return_once(|_, _| Err(SocialGraphRepositoryError::duplicate_edge()));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let error = service
        .follow(&follower, &followee)
        .await
        .expect_err("duplicate follow");

    assert_eq!(error.code(), ErrorCode::AlreadyFollowing);
    assert_eq!(error.message(), "already following this user");
}

#[tokio::test]
async fn unfollow_without_an_edge_is_not_following() {
    let mut graph = MockSocialGraphRepository::new();
    graph
        .expect_delete_edge()
        .times(1)
        .return_once(|_, _| Ok(false));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let error = service
        .unfollow(&UserId::random(), &UserId::random())
        .await
        .expect_err("no edge");

    assert_eq!(error.code(), ErrorCode::NotFollowing);
}

#[tokio::test]
async fn is_following_self_is_always_false() {
    let user = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph.expect_edge_exists().times(0);

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let result = service
        .is_following(&user, &user)
        .await
        .expect("read succeeds");

    assert!(!result);
}

#[tokio::test]
async fn connection_failures_surface_as_service_unavailable() {
    let mut graph = MockSocialGraphRepository::new();
    graph
        .expect_followers()
        .times(1)
        .return_once(|_| Err(SocialGraphRepositoryError::connection("pool exhausted")));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let error = service
        .followers(&UserId::random())
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn follow_suggestions_validate_the_limit() {
    let mut graph = MockSocialGraphRepository::new();
    graph.expect_follow_suggestions().times(0);

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let error = service
        .follow_suggestions(&UserId::random(), 0)
        .await
        .expect_err("limit out of range");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn follow_suggestions_pass_the_validated_limit_through() {
    let candidates = vec![profile("ada"), profile("grace")];

    let mut graph = MockSocialGraphRepository::new();
    let returned = candidates.clone();
    graph
        .expect_follow_suggestions()
        .withf(|_, limit| *limit == 10)
        .times(1)
        .return_once(move |_, _| Ok(returned));

    let service = SocialGraphService::new(Arc::new(graph), Arc::new(users_that_exist()));
    let suggestions = service
        .follow_suggestions(&UserId::random(), 10)
        .await
        .expect("suggestions succeed");

    assert_eq!(suggestions, candidates);
}
