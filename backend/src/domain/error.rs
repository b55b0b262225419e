//! Domain-level error type.
//!
//! These errors are transport agnostic. The calling layer maps codes to
//! HTTP statuses (or any other envelope); the messages are part of the
//! contract and name the specific rule that was violated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The input is malformed or fails validation.
    InvalidRequest,
    /// A user attempted to follow themselves.
    SelfFollow,
    /// The follow edge already exists.
    AlreadyFollowing,
    /// No follow edge exists to remove.
    NotFollowing,
    /// The requested resource does not exist.
    NotFound,
    /// A uniqueness or state conflict that is not a follow duplicate.
    Conflict,
    /// The atomic account-deletion sequence failed; no partial state exists.
    DeletionFailed,
    /// A backing store could not be reached.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload: a stable code, a human-readable message, and
/// optional structured details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create an error from a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message naming the violated rule.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details, when attached.
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// A user attempted to follow themselves.
    pub fn self_follow() -> Self {
        Self::new(ErrorCode::SelfFollow, "users cannot follow themselves")
    }

    /// The follow edge already exists.
    pub fn already_following() -> Self {
        Self::new(ErrorCode::AlreadyFollowing, "already following this user")
    }

    /// No follow edge exists to remove.
    pub fn not_following() -> Self {
        Self::new(ErrorCode::NotFollowing, "not following this user")
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::DeletionFailed`].
    pub fn deletion_failed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DeletionFailed,
            format!("account deletion failed: {}", message.into()),
        )
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn contract_messages_name_the_rule() {
        assert_eq!(Error::self_follow().message(), "users cannot follow themselves");
        assert_eq!(
            Error::already_following().message(),
            "already following this user"
        );
        assert_eq!(Error::not_following().message(), "not following this user");
    }

    #[test]
    fn deletion_failed_wraps_the_cause() {
        let error = Error::deletion_failed("connection reset");
        assert_eq!(error.code(), ErrorCode::DeletionFailed);
        assert_eq!(
            error.message(),
            "account deletion failed: connection reset"
        );
    }

    #[test]
    fn details_round_trip_through_serde() {
        let error = Error::not_found("album not found").with_details(json!({"albumId": "x1"}));
        let value = serde_json::to_value(&error).expect("serializes");
        let back: Error = serde_json::from_value(value).expect("deserializes");
        assert_eq!(back, error);
        assert_eq!(back.details(), Some(&json!({"albumId": "x1"})));
    }
}
