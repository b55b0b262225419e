//! Port for account storage and profile lookups.

use async_trait::async_trait;

use crate::domain::{CredentialHash, EmailAddress, User, UserId, UserProfile, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The username or email is already taken.
        DuplicateUser { message: String } =>
            "user already exists: {message}",
    }
}

/// Validated input for a registration write.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Identifier chosen by the caller (UUID v4).
    pub id: UserId,
    /// Unique public handle.
    pub username: Username,
    /// Unique contact address.
    pub email: EmailAddress,
    /// Opaque hash supplied by the auth collaborator.
    pub credential_hash: CredentialHash,
}

/// Port for account persistence.
///
/// Deletion is deliberately absent: accounts are removed only through the
/// atomic purge port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account; uniqueness of username and email is enforced
    /// by the backing store.
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Fetch the public projection for a user, when the account exists.
    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError>;

    /// Whether the account exists.
    async fn exists(&self, user: &UserId) -> Result<bool, UserRepositoryError>;
}
