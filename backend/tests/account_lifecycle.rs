//! End-to-end story over the in-memory adapters: follow, rate, review,
//! read feeds, then delete the account and verify anonymization.

use std::sync::Arc;
use std::time::Duration;

use pagination::PageRequest;

use backend::domain::ports::{FixtureAlbumCatalog, SessionStore};
use backend::domain::{
    AccountDeletionService, ActivityFeedService, ActivityKind, AlbumId, ContentService, ErrorCode,
    SocialGraphService, UserId,
};
use backend::outbound::cache::InMemorySessionStore;
use backend::test_support::InMemoryBackend;

struct Harness {
    backend: Arc<InMemoryBackend>,
    sessions: Arc<InMemorySessionStore>,
    graph: SocialGraphService<InMemoryBackend, InMemoryBackend>,
    content:
        ContentService<InMemoryBackend, InMemoryBackend, InMemoryBackend, FixtureAlbumCatalog>,
    feeds: ActivityFeedService<InMemoryBackend, InMemoryBackend>,
    deletion: AccountDeletionService<InMemoryBackend, InMemorySessionStore>,
}

impl Harness {
    fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        Self {
            graph: SocialGraphService::new(Arc::clone(&backend), Arc::clone(&backend)),
            content: ContentService::new(
                Arc::clone(&backend),
                Arc::clone(&backend),
                Arc::clone(&backend),
                Arc::new(FixtureAlbumCatalog),
            ),
            feeds: ActivityFeedService::new(Arc::clone(&backend), Arc::clone(&backend)),
            deletion: AccountDeletionService::new(Arc::clone(&backend), Arc::clone(&sessions)),
            backend,
            sessions,
        }
    }
}

fn album(id: &str) -> AlbumId {
    AlbumId::new(id).expect("valid album id")
}

#[tokio::test]
async fn feed_reflects_followed_activity_and_replaces_repeat_events() {
    let h = Harness::new();
    let ada = h.backend.register_user("ada");
    let brian = h.backend.register_user("brian");

    h.graph.follow(&brian, &ada).await.expect("follow succeeds");

    let blue = album("blue-train");
    let kind = album("kind-of-blue");
    h.content.rate_album(&ada, &blue, 3).await.expect("rating accepted");
    h.content
        .review_album(&ada, &kind, "modal masterpiece")
        .await
        .expect("review accepted");
    h.content.rate_album(&ada, &blue, 5).await.expect("re-rating accepted");

    let feed = h
        .feeds
        .feed(&brian, PageRequest::default())
        .await
        .expect("feed loads");

    // The re-rating replaced the earlier event, so two events remain and
    // the rating leads with its updated payload.
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].kind, ActivityKind::Rating);
    assert_eq!(feed[0].album_id, blue);
    assert_eq!(feed[0].payload, serde_json::Value::from(5_i16));
    assert_eq!(feed[1].kind, ActivityKind::Review);

    // Ada follows no one, so her personalised feed is empty even though
    // she has activity of her own.
    let own_feed = h
        .feeds
        .feed(&ada, PageRequest::default())
        .await
        .expect("feed loads");
    assert!(own_feed.is_empty());
}

#[tokio::test]
async fn graph_invariants_hold_across_follow_and_unfollow() {
    let h = Harness::new();
    let ada = h.backend.register_user("ada");
    let brian = h.backend.register_user("brian");
    let carol = h.backend.register_user("carol");

    h.graph.follow(&brian, &ada).await.expect("follow succeeds");
    h.graph.follow(&carol, &ada).await.expect("follow succeeds");
    h.graph.follow(&ada, &brian).await.expect("follow succeeds");

    assert_eq!(h.graph.follower_count(&ada).await.expect("count"), 2);
    assert_eq!(h.graph.following_count(&ada).await.expect("count"), 1);

    let mutuals = h.graph.mutual_follows(&ada).await.expect("mutuals load");
    assert_eq!(mutuals.len(), 1);
    assert_eq!(mutuals[0].id, brian);

    // carol follows ada, ada follows brian: brian is carol's suggestion.
    let suggestions = h
        .graph
        .follow_suggestions(&carol, 10)
        .await
        .expect("suggestions load");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].id, brian);

    h.graph.unfollow(&brian, &ada).await.expect("unfollow succeeds");
    assert_eq!(h.graph.follower_count(&ada).await.expect("count"), 1);
    let error = h
        .graph
        .unfollow(&brian, &ada)
        .await
        .expect_err("nothing to remove");
    assert_eq!(error.code(), ErrorCode::NotFollowing);
}

#[tokio::test]
async fn account_deletion_anonymizes_content_and_preserves_aggregates() {
    let h = Harness::new();
    let ada = h.backend.register_user("ada");
    let brian = h.backend.register_user("brian");
    let carol = h.backend.register_user("carol");

    h.graph.follow(&brian, &ada).await.expect("follow succeeds");
    h.graph.follow(&carol, &ada).await.expect("follow succeeds");
    h.graph.follow(&ada, &brian).await.expect("follow succeeds");

    let blue = album("blue-train");
    let kind = album("kind-of-blue");
    h.content.rate_album(&ada, &blue, 4).await.expect("rating accepted");
    h.content.rate_album(&ada, &kind, 5).await.expect("rating accepted");
    h.content.rate_album(&brian, &blue, 2).await.expect("rating accepted");
    h.content
        .review_album(&ada, &blue, "essential listening")
        .await
        .expect("review accepted");

    let average_before = h.content.average_rating(&blue).await.expect("average");
    assert!((average_before - 3.0).abs() < f64::EPSILON);

    h.sessions
        .set(&format!("session:{ada}"), "token", Duration::from_secs(3600))
        .await
        .expect("session stored");

    let audit = h.deletion.delete_account(&ada).await.expect("deletion succeeds");
    assert_eq!(audit.user_id, ada);
    assert_eq!(audit.ratings_count, 2);
    assert_eq!(audit.reviews_count, 1);
    assert_eq!(audit.follows_count, 3);
    assert_eq!(h.backend.audits().len(), 1);

    // Aggregates are untouched; the rows lose their owner but keep their
    // values.
    let average_after = h.content.average_rating(&blue).await.expect("average");
    assert!((average_after - 3.0).abs() < f64::EPSILON);
    assert_eq!(h.content.rating_count(&blue).await.expect("count"), 2);
    assert_eq!(h.content.review_count(&blue).await.expect("count"), 1);

    let ratings = h.content.ratings_for_album(&blue).await.expect("ratings load");
    let anonymized: Vec<_> = ratings
        .iter()
        .filter(|rating| rating.owner.is_anonymized())
        .collect();
    assert_eq!(anonymized.len(), 1);
    assert_eq!(anonymized[0].value.get(), 4);

    let reviews = h.content.reviews_for_album(&blue).await.expect("reviews load");
    assert!(reviews[0].owner.is_anonymized());
    assert_eq!(reviews[0].body.as_str(), "essential listening");

    // The graph forgets the account in both directions.
    assert_eq!(h.graph.follower_count(&brian).await.expect("count"), 0);
    let brian_feed = h
        .feeds
        .feed(&brian, PageRequest::default())
        .await
        .expect("feed loads");
    assert!(brian_feed.is_empty());

    // Anonymized events stay in the global feed without an actor.
    let recent = h
        .feeds
        .recent(PageRequest::default())
        .await
        .expect("recent loads");
    assert!(recent
        .iter()
        .filter(|event| event.actor.is_anonymized())
        .count() >= 3);

    // Session invalidated, profile gone, repeat deletion is NotFound.
    assert!(!h
        .sessions
        .exists(&format!("session:{ada}"))
        .await
        .expect("exists succeeds"));
    let error = h.deletion.delete_account(&ada).await.expect_err("already gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(h.backend.audits().len(), 1);
}

#[tokio::test]
async fn deleted_accounts_cannot_be_followed() {
    let h = Harness::new();
    let ada = h.backend.register_user("ada");
    let brian = h.backend.register_user("brian");

    h.deletion.delete_account(&ada).await.expect("deletion succeeds");

    let error = h.graph.follow(&brian, &ada).await.expect_err("target gone");
    assert_eq!(error.code(), ErrorCode::NotFound);

    let error = h
        .graph
        .follow(&brian, &UserId::random())
        .await
        .expect_err("unknown target");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
