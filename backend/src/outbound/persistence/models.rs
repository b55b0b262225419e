//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. They exist solely to satisfy
//! Diesel's type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{account_deletion_audit, activities, follows, ratings, reviews, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub credential_hash: &'a str,
}

/// Projection for profile reads; skips credential material entirely.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub username: String,
}

/// Row struct for reading from the follows table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FollowRow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating follow edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

/// Row struct for reading from the ratings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub album_id: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the rating upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub album_id: &'a str,
    pub rating: i16,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub album_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the review upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub album_id: &'a str,
    pub content: &'a str,
}

/// Row struct for reading from the activities table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ActivityRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub activity_type: String,
    pub album_id: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the activity upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub(crate) struct NewActivityRow<'a> {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub activity_type: &'a str,
    pub album_id: &'a str,
    pub payload: &'a serde_json::Value,
}

/// Row struct for reading from the account_deletion_audit table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_deletion_audit)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DeletionAuditRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub deleted_at: DateTime<Utc>,
    pub ratings_count: i64,
    pub reviews_count: i64,
    pub follows_count: i64,
}

/// Insertable struct for recording a completed deletion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_deletion_audit)]
pub(crate) struct NewDeletionAuditRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ratings_count: i64,
    pub reviews_count: i64,
    pub follows_count: i64,
}
