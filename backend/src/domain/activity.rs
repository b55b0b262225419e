//! Activity events driving the social feeds.
//!
//! One event exists per (actor, kind, album): accepting a rating or review
//! upsert records the event, and a later upsert on the same pair replaces
//! the event's payload and timestamp instead of appending a second entry.
//! Events are never deleted; account deletion anonymizes the actor so other
//! users' feed history stays intact.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::AlbumId;
use super::user::UserId;

/// The kind of content action an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A star rating was created or changed.
    Rating,
    /// A review was created or changed.
    Review,
}

impl ActivityKind {
    /// Wire representation stored in the `kind` column and accepted as a
    /// feed filter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a feed filter string is not a recognised kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("activity type must be rating or review")]
pub struct UnknownActivityKind;

impl FromStr for ActivityKind {
    type Err = UnknownActivityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rating" => Ok(Self::Rating),
            "review" => Ok(Self::Review),
            _ => Err(UnknownActivityKind),
        }
    }
}

/// A recorded content action, as served in feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Event identifier; the ascending tie-break for equal timestamps.
    pub id: Uuid,
    /// Acting user, or the anonymized marker after account deletion.
    pub actor: super::content::Attribution,
    /// What kind of action this records.
    pub kind: ActivityKind,
    /// The album acted on.
    pub album_id: AlbumId,
    /// The rating value or review text at the time of the action.
    pub payload: serde_json::Value,
    /// When the action (or its latest replacement) happened.
    pub created_at: DateTime<Utc>,
}

/// Input for recording an accepted content action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    /// Acting user.
    pub actor: UserId,
    /// What kind of action happened.
    pub kind: ActivityKind,
    /// The album acted on.
    pub album_id: AlbumId,
    /// The rating value or review text being recorded.
    pub payload: serde_json::Value,
}
