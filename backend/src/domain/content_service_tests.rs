//! Tests for the ratings and reviews service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    FixtureAlbumCatalog, MockActivityRepository, MockAlbumCatalog, MockRatingRepository,
    MockReviewRepository, RatingRepositoryError,
};
use crate::domain::{ActivityEvent, Attribution, ErrorCode};

fn album() -> AlbumId {
    AlbumId::new("OK4jzGZcQ4P8C0KGrvlM").expect("valid album id")
}

fn stored_rating(owner: UserId, album_id: &AlbumId, value: i16) -> Rating {
    let now = Utc::now();
    Rating {
        id: Uuid::new_v4(),
        owner: Attribution::User(owner),
        album_id: album_id.clone(),
        value: RatingValue::new(value).expect("valid rating"),
        created_at: now,
        updated_at: now,
    }
}

fn recorded_event(activity: &NewActivity) -> ActivityEvent {
    ActivityEvent {
        id: Uuid::new_v4(),
        actor: Attribution::User(activity.actor),
        kind: activity.kind,
        album_id: activity.album_id.clone(),
        payload: activity.payload.clone(),
        created_at: Utc::now(),
    }
}

fn service_with(
    ratings: MockRatingRepository,
    reviews: MockReviewRepository,
    activities: MockActivityRepository,
) -> ContentService<MockRatingRepository, MockReviewRepository, MockActivityRepository, FixtureAlbumCatalog>
{
    ContentService::new(
        Arc::new(ratings),
        Arc::new(reviews),
        Arc::new(activities),
        Arc::new(FixtureAlbumCatalog),
    )
}

#[tokio::test]
async fn rate_album_upserts_and_records_one_event() {
    let owner = UserId::random();
    let target = album();
    let stored = stored_rating(owner, &target, 4);

    let mut ratings = MockRatingRepository::new();
    let returned = stored.clone();
    ratings
        .expect_upsert()
        .withf(|_, _, value| value.get() == 4)
        .times(1)
        .return_once(move |_, _, _| Ok(returned));

    let mut activities = MockActivityRepository::new();
    activities
        .expect_record()
        .withf(|activity| {
            activity.kind == ActivityKind::Rating && activity.payload == Value::from(4_i16)
        })
        .times(1)
        .returning(|activity| Ok(recorded_event(activity)));

    let service = service_with(ratings, MockReviewRepository::new(), activities);
    let result = service
        .rate_album(&owner, &target, 4)
        .await
        .expect("rating accepted");

    assert_eq!(result, stored);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-3)]
#[tokio::test]
async fn rate_album_rejects_out_of_range_values_without_side_effects(#[case] value: i16) {
    let mut ratings = MockRatingRepository::new();
    ratings.expect_upsert().times(0);
    let mut activities = MockActivityRepository::new();
    activities.expect_record().times(0);

    let service = service_with(ratings, MockReviewRepository::new(), activities);
    let error = service
        .rate_album(&UserId::random(), &album(), value)
        .await
        .expect_err("invalid rating");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "rating must be an integer between 1 and 5");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
#[tokio::test]
async fn review_album_rejects_whitespace_content_without_side_effects(#[case] body: &str) {
    let mut reviews = MockReviewRepository::new();
    reviews.expect_upsert().times(0);
    let mut activities = MockActivityRepository::new();
    activities.expect_record().times(0);

    let service = service_with(MockRatingRepository::new(), reviews, activities);
    let error = service
        .review_album(&UserId::random(), &album(), body)
        .await
        .expect_err("empty review");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "review content must not be empty");
}

#[tokio::test]
async fn review_album_records_the_trimmed_text_as_payload() {
    let owner = UserId::random();
    let target = album();

    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_upsert()
        .withf(|_, _, body| body.as_str() == "a fine record")
        .times(1)
        .returning(|owner_id, album_id, body| {
            let now = Utc::now();
            Ok(Review {
                id: Uuid::new_v4(),
                owner: Attribution::User(*owner_id),
                album_id: album_id.clone(),
                body: body.clone(),
                created_at: now,
                updated_at: now,
            })
        });

    let mut activities = MockActivityRepository::new();
    activities
        .expect_record()
        .withf(|activity| {
            activity.kind == ActivityKind::Review
                && activity.payload == Value::from("a fine record")
        })
        .times(1)
        .returning(|activity| Ok(recorded_event(activity)));

    let service = service_with(MockRatingRepository::new(), reviews, activities);
    let review = service
        .review_album(&owner, &target, "  a fine record  ")
        .await
        .expect("review accepted");

    assert_eq!(review.body.as_str(), "a fine record");
}

#[tokio::test]
async fn writes_against_unknown_albums_are_not_found() {
    let mut catalog = MockAlbumCatalog::new();
    catalog.expect_album_exists().returning(|_| Ok(false));
    let mut ratings = MockRatingRepository::new();
    ratings.expect_upsert().times(0);

    let service = ContentService::new(
        Arc::new(ratings),
        Arc::new(MockReviewRepository::new()),
        Arc::new(MockActivityRepository::new()),
        Arc::new(catalog),
    );
    let error = service
        .rate_album(&UserId::random(), &album(), 3)
        .await
        .expect_err("unknown album");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(None, 0.0)]
#[case(Some(4.5), 4.5)]
#[case(Some(3.333_333_333), 3.33)]
#[case(Some(3.335), 3.34)]
#[tokio::test]
async fn average_rating_rounds_to_two_decimals(
    #[case] raw: Option<f64>,
    #[case] expected: f64,
) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_average_for_album()
        .times(1)
        .return_once(move |_| Ok(raw));

    let service = service_with(
        ratings,
        MockReviewRepository::new(),
        MockActivityRepository::new(),
    );
    let average = service
        .average_rating(&album())
        .await
        .expect("average succeeds");

    assert!((average - expected).abs() < f64::EPSILON);
}

#[tokio::test]
async fn delete_rating_maps_missing_rows_to_not_found() {
    let mut ratings = MockRatingRepository::new();
    ratings.expect_delete().times(1).return_once(|_, _| Ok(false));

    let service = service_with(
        ratings,
        MockReviewRepository::new(),
        MockActivityRepository::new(),
    );
    let error = service
        .delete_rating(&UserId::random(), &album())
        .await
        .expect_err("nothing to delete");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn repository_outage_surfaces_as_service_unavailable() {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_upsert()
        .times(1)
        .return_once(|_, _, _| Err(RatingRepositoryError::connection("pool exhausted")));

    let service = service_with(
        ratings,
        MockReviewRepository::new(),
        MockActivityRepository::new(),
    );
    let error = service
        .rate_album(&UserId::random(), &album(), 5)
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
