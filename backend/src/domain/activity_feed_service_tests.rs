//! Tests for the activity feed service.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockActivityRepository, MockSocialGraphRepository};
use crate::domain::{AlbumId, Attribution, ErrorCode, UserProfile, Username};

fn profile_for(id: UserId, name: &str) -> UserProfile {
    UserProfile {
        id,
        username: Username::new(name).expect("valid username"),
    }
}

fn event_by(actor: UserId) -> ActivityEvent {
    ActivityEvent {
        id: Uuid::new_v4(),
        actor: Attribution::User(actor),
        kind: ActivityKind::Rating,
        album_id: AlbumId::new("album-1").expect("valid album id"),
        payload: Value::from(5_i16),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn empty_follow_list_short_circuits_without_an_activity_query() {
    let mut graph = MockSocialGraphRepository::new();
    graph.expect_following().times(1).return_once(|_| Ok(vec![]));

    let mut activities = MockActivityRepository::new();
    activities.expect_list_by_actors().times(0);
    activities.expect_count_by_actors().times(0);

    let service = ActivityFeedService::new(Arc::new(graph), Arc::new(activities));
    let feed = service
        .feed(&UserId::random(), PageRequest::default())
        .await
        .expect("feed succeeds");

    assert!(feed.is_empty());
}

#[tokio::test]
async fn empty_follow_list_yields_an_empty_envelope() {
    let mut graph = MockSocialGraphRepository::new();
    graph.expect_following().times(1).return_once(|_| Ok(vec![]));

    let mut activities = MockActivityRepository::new();
    activities.expect_list_by_actors().times(0);
    activities.expect_count_by_actors().times(0);

    let service = ActivityFeedService::new(Arc::new(graph), Arc::new(activities));
    let page = service
        .feed_page(&UserId::random(), 1, Some(20))
        .await
        .expect("feed page succeeds");

    assert!(page.items.is_empty());
    assert_eq!(page.info.total, 0);
    assert!(!page.info.has_more);
}

#[tokio::test]
async fn feed_queries_only_the_followed_actors() {
    let followee = UserId::random();
    let events = vec![event_by(followee)];

    let mut graph = MockSocialGraphRepository::new();
    graph
        .expect_following()
        .times(1)
        .return_once(move |_| Ok(vec![profile_for(followee, "ada")]));

    let mut activities = MockActivityRepository::new();
    let returned = events.clone();
    activities
        .expect_list_by_actors()
        .withf(move |actors, limit, offset| {
            actors == [followee] && *limit == 20 && *offset == 0
        })
        .times(1)
        .return_once(move |_, _, _| Ok(returned));

    let service = ActivityFeedService::new(Arc::new(graph), Arc::new(activities));
    let feed = service
        .feed(&UserId::random(), PageRequest::default())
        .await
        .expect("feed succeeds");

    assert_eq!(feed, events);
}

#[tokio::test]
async fn feed_page_reports_exact_total_and_has_more() {
    let followee = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph
        .expect_following()
        .times(1)
        .return_once(move |_| Ok(vec![profile_for(followee, "ada")]));

    let mut activities = MockActivityRepository::new();
    activities
        .expect_list_by_actors()
        .times(1)
        .return_once(move |_, _, _| Ok(vec![event_by(followee), event_by(followee)]));
    activities
        .expect_count_by_actors()
        .times(1)
        .return_once(|_| Ok(5));

    let service = ActivityFeedService::new(Arc::new(graph), Arc::new(activities));
    let page = service
        .feed_page(&UserId::random(), 1, Some(2))
        .await
        .expect("feed page succeeds");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.info.total, 5);
    assert!(page.info.has_more);
    assert_eq!(page.info.page, 1);
    assert_eq!(page.info.limit, 2);
}

#[tokio::test]
async fn feed_page_rejects_out_of_range_pagination() {
    let mut graph = MockSocialGraphRepository::new();
    graph.expect_following().times(0);

    let service = ActivityFeedService::new(
        Arc::new(graph),
        Arc::new(MockActivityRepository::new()),
    );
    let error = service
        .feed_page(&UserId::random(), 1, Some(101))
        .await
        .expect_err("limit out of range");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn user_feed_ignores_the_follow_graph() {
    let user = UserId::random();

    let mut graph = MockSocialGraphRepository::new();
    graph.expect_following().times(0);

    let mut activities = MockActivityRepository::new();
    activities
        .expect_list_by_actor()
        .withf(move |actor, _, _| *actor == user)
        .times(1)
        .return_once(move |actor, _, _| Ok(vec![event_by(*actor)]));

    let service = ActivityFeedService::new(Arc::new(graph), Arc::new(activities));
    let feed = service
        .user_feed(&user, PageRequest::default())
        .await
        .expect("user feed succeeds");

    assert_eq!(feed.len(), 1);
}

#[tokio::test]
async fn by_kind_rejects_unrecognised_filters() {
    let mut activities = MockActivityRepository::new();
    activities.expect_list_by_kind().times(0);

    let service = ActivityFeedService::new(
        Arc::new(MockSocialGraphRepository::new()),
        Arc::new(activities),
    );
    let error = service
        .by_kind("like", PageRequest::default())
        .await
        .expect_err("unknown kind");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "activity type must be rating or review");
}

#[tokio::test]
async fn by_kind_passes_the_parsed_kind_through() {
    let mut activities = MockActivityRepository::new();
    activities
        .expect_list_by_kind()
        .withf(|kind, _, _| *kind == ActivityKind::Review)
        .times(1)
        .return_once(|_, _, _| Ok(vec![]));

    let service = ActivityFeedService::new(
        Arc::new(MockSocialGraphRepository::new()),
        Arc::new(activities),
    );
    let feed = service
        .by_kind("review", PageRequest::default())
        .await
        .expect("filter succeeds");

    assert!(feed.is_empty());
}

#[tokio::test]
async fn has_activities_is_exactly_count_greater_than_zero() {
    let mut activities = MockActivityRepository::new();
    let mut sequence = mockall::Sequence::new();
    activities
        .expect_count_by_actor()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(0));
    activities
        .expect_count_by_actor()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(3));

    let service = ActivityFeedService::new(
        Arc::new(MockSocialGraphRepository::new()),
        Arc::new(activities),
    );
    let user = UserId::random();

    assert!(!service.has_activities(&user).await.expect("probe succeeds"));
    assert!(service.has_activities(&user).await.expect("probe succeeds"));
}
