//! Ratings, reviews, and the value types that validate them.
//!
//! A [`Rating`] or [`Review`] always satisfies its invariants once
//! constructed: the rating value is an integer between 1 and 5 and the
//! review body is trimmed, non-empty, and bounded. Ownership is modelled as
//! [`Attribution`] rather than a nullable id so every consumer must handle
//! the anonymized state explicitly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Validation errors returned by the content value type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    EmptyAlbumId,
    AlbumIdTooLong { max: usize },
    RatingOutOfRange,
    EmptyReviewBody,
    ReviewBodyTooLong { max: usize },
}

impl fmt::Display for ContentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAlbumId => write!(f, "album id must not be empty"),
            Self::AlbumIdTooLong { max } => {
                write!(f, "album id must be at most {max} characters")
            }
            Self::RatingOutOfRange => {
                write!(f, "rating must be an integer between 1 and 5")
            }
            Self::EmptyReviewBody => write!(f, "review content must not be empty"),
            Self::ReviewBodyTooLong { max } => {
                write!(f, "review content must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ContentValidationError {}

/// Maximum accepted length for a catalog album identifier.
pub const ALBUM_ID_MAX: usize = 64;

/// Identifier of an album in the external music catalog.
///
/// The core treats this as an opaque token; existence is checked through the
/// catalog collaborator before any write that references it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlbumId(String);

impl AlbumId {
    /// Validate and construct an [`AlbumId`]. Input is trimmed.
    pub fn new(id: impl Into<String>) -> Result<Self, ContentValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, ContentValidationError> {
        let id = id.trim().to_owned();
        if id.is_empty() {
            return Err(ContentValidationError::EmptyAlbumId);
        }
        if id.chars().count() > ALBUM_ID_MAX {
            return Err(ContentValidationError::AlbumIdTooLong { max: ALBUM_ID_MAX });
        }
        Ok(Self(id))
    }

    /// The identifier as the catalog collaborator knows it.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AlbumId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AlbumId> for String {
    fn from(value: AlbumId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AlbumId {
    type Error = ContentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A star rating: an integer between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct RatingValue(i16);

impl RatingValue {
    /// Validate and construct a [`RatingValue`].
    pub const fn new(value: i16) -> Result<Self, ContentValidationError> {
        if value >= 1 && value <= 5 {
            Ok(Self(value))
        } else {
            Err(ContentValidationError::RatingOutOfRange)
        }
    }

    /// The validated integer value.
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RatingValue> for i16 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = ContentValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum accepted length for review content, in characters.
pub const REVIEW_BODY_MAX: usize = 5000;

/// Free-text review content, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewBody(String);

impl ReviewBody {
    /// Validate and construct a [`ReviewBody`].
    ///
    /// Input is trimmed before both checks, so whitespace-only content is
    /// rejected the same way as an empty string.
    pub fn new(body: impl Into<String>) -> Result<Self, ContentValidationError> {
        Self::from_owned(body.into())
    }

    fn from_owned(body: String) -> Result<Self, ContentValidationError> {
        let body = body.trim().to_owned();
        if body.is_empty() {
            return Err(ContentValidationError::EmptyReviewBody);
        }
        if body.chars().count() > REVIEW_BODY_MAX {
            return Err(ContentValidationError::ReviewBodyTooLong {
                max: REVIEW_BODY_MAX,
            });
        }
        Ok(Self(body))
    }

    /// The trimmed review text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ReviewBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReviewBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ReviewBody> for String {
    fn from(value: ReviewBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewBody {
    type Error = ContentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Ownership state of a rating, review, or activity event.
///
/// Account deletion anonymizes rows instead of deleting them; the record and
/// its aggregate contribution persist while the identity reference is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "userId")]
pub enum Attribution {
    /// The record is owned by a live account.
    User(UserId),
    /// The owning account has been deleted; the record persists.
    Anonymized,
}

impl Attribution {
    /// The owning user, when the record is still attributed.
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User(id) => Some(id),
            Self::Anonymized => None,
        }
    }

    /// Whether the owning account has been deleted.
    pub const fn is_anonymized(&self) -> bool {
        matches!(self, Self::Anonymized)
    }
}

impl From<Option<UserId>> for Attribution {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Self::Anonymized, Self::User)
    }
}

/// One user's star rating of one album.
///
/// At most one rating exists per (owner, album) pair while the owner is a
/// live account; repeated ratings update the row in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Row identifier, stable across upserts.
    pub id: Uuid,
    /// Owner, or the anonymized marker after account deletion.
    pub owner: Attribution,
    /// The rated album.
    pub album_id: AlbumId,
    /// The star value.
    pub value: RatingValue,
    /// First-rating timestamp; unchanged by upserts.
    pub created_at: DateTime<Utc>,
    /// Advances on every accepted upsert, including no-op value repeats.
    pub updated_at: DateTime<Utc>,
}

/// One user's free-text review of one album.
///
/// Shares the (owner, album) uniqueness and upsert contract with [`Rating`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Row identifier, stable across upserts.
    pub id: Uuid,
    /// Owner, or the anonymized marker after account deletion.
    pub owner: Attribution,
    /// The reviewed album.
    pub album_id: AlbumId,
    /// Trimmed review text.
    pub body: ReviewBody,
    /// First-review timestamp; unchanged by upserts.
    pub created_at: DateTime<Utc>,
    /// Advances on every accepted upsert.
    pub updated_at: DateTime<Utc>,
}
