//! Forensic audit record for account deletions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Permanent record of an account deletion's scope.
///
/// Written exactly once per deletion, inside the same transaction as the
/// destructive steps, with counts computed before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionAudit {
    /// Audit row identifier.
    pub id: Uuid,
    /// The deleted account. Kept as a plain id: the user row is gone, so
    /// this is deliberately not a foreign key.
    pub user_id: UserId,
    /// When the deletion committed.
    pub deleted_at: DateTime<Utc>,
    /// Ratings anonymized by the deletion.
    pub ratings_count: u64,
    /// Reviews anonymized by the deletion.
    pub reviews_count: u64,
    /// Follow edges removed, counting both directions.
    pub follows_count: u64,
}
