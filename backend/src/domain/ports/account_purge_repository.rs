//! Port for the atomic account-deletion unit of work.

use async_trait::async_trait;

use crate::domain::{DeletionAudit, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account purge adapters.
    pub enum AccountPurgeError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account purge connection failed: {message}",
        /// A step of the purge sequence failed; the transaction rolled back.
        Query { message: String } =>
            "account purge failed: {message}",
        /// The user row did not exist; the transaction rolled back and no
        /// audit record was written.
        UserMissing =>
            "account not found",
    }
}

/// Port for the account-deletion transaction.
///
/// One call runs the whole fixed sequence inside a single transaction:
/// write the audit record with pre-mutation counts, anonymize the user's
/// ratings, reviews, and activity events, delete their follow edges in both
/// directions, and delete the user row. Either everything commits or
/// nothing does; a concurrent reader observes fully-pre-deletion or
/// fully-post-deletion state, never a partially anonymized mix.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountPurgeRepository: Send + Sync {
    /// Execute the purge and return the committed audit record.
    async fn purge(&self, user: &UserId) -> Result<DeletionAudit, AccountPurgeError>;
}
