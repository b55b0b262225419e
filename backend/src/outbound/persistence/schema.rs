//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel
//! uses them for compile-time query validation and type-safe SQL
//! generation.
//!
//! Ownership columns on content tables are nullable on purpose: account
//! deletion anonymizes rows by setting `user_id` to NULL instead of
//! removing them. PostgreSQL treats NULLs as distinct in unique indexes,
//! so the (user_id, album_id) uniqueness constraint only ever binds rows
//! that still have an owner.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique public handle (3-30 characters).
        #[max_length = 30]
        username -> Varchar,
        /// Unique contact address, stored lowercased.
        #[max_length = 254]
        email -> Varchar,
        /// Opaque credential hash owned by the auth collaborator.
        credential_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges; unique on (follower_id, followee_id).
    follows (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The user who follows.
        follower_id -> Uuid,
        /// The user being followed.
        followee_id -> Uuid,
        /// When the edge was created.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Album ratings; unique on (user_id, album_id) for owned rows.
    ratings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owner, or NULL once the account has been deleted.
        user_id -> Nullable<Uuid>,
        /// External catalog album identifier.
        #[max_length = 64]
        album_id -> Varchar,
        /// Star value, constrained to 1..=5.
        rating -> Int2,
        /// Record creation timestamp; survives upserts.
        created_at -> Timestamptz,
        /// Advanced on every upsert.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Album reviews; unique on (user_id, album_id) for owned rows.
    reviews (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owner, or NULL once the account has been deleted.
        user_id -> Nullable<Uuid>,
        /// External catalog album identifier.
        #[max_length = 64]
        album_id -> Varchar,
        /// Trimmed review text (max 5000 characters).
        content -> Text,
        /// Record creation timestamp; survives upserts.
        created_at -> Timestamptz,
        /// Advanced on every upsert.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Activity log; unique on (user_id, activity_type, album_id) for
    /// owned rows, so re-rating replaces the earlier event.
    activities (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Actor, or NULL once the account has been deleted.
        user_id -> Nullable<Uuid>,
        /// Event kind: `rating` or `review`.
        #[max_length = 16]
        activity_type -> Varchar,
        /// External catalog album identifier.
        #[max_length = 64]
        album_id -> Varchar,
        /// Kind-specific payload: the star value or the review text.
        payload -> Jsonb,
        /// Event timestamp; replaced when the event is replaced.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Audit trail of completed account deletions.
    account_deletion_audit (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The deleted account's identifier; kept after the user row goes.
        user_id -> Uuid,
        /// When the deletion transaction committed.
        deleted_at -> Timestamptz,
        /// Ratings anonymized by the deletion.
        ratings_count -> Int8,
        /// Reviews anonymized by the deletion.
        reviews_count -> Int8,
        /// Follow edges removed in both directions.
        follows_count -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    follows,
    ratings,
    reviews,
    activities,
    account_deletion_audit,
);
