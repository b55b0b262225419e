//! Account deletion orchestration.
//!
//! The destructive work is a single transaction behind the purge port:
//! audit record, content and activity anonymization, edge removal, and the
//! user-row delete commit or roll back together. Session invalidation is
//! best-effort and runs outside the transaction; its failure is logged and
//! never fails the deletion.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{
    AccountPurgeError, AccountPurgeRepository, SessionStore, SessionStoreError,
};
use crate::domain::{DeletionAudit, Error, UserId};

fn map_purge_error(error: AccountPurgeError) -> Error {
    match error {
        AccountPurgeError::UserMissing => Error::not_found("account not found"),
        AccountPurgeError::Connection { message } | AccountPurgeError::Query { message } => {
            Error::deletion_failed(message)
        }
    }
}

/// Cache key holding a user's active session.
fn session_key(user: &UserId) -> String {
    format!("session:{user}")
}

/// Account deletion service.
#[derive(Clone)]
pub struct AccountDeletionService<P, S> {
    purge_repo: Arc<P>,
    sessions: Arc<S>,
}

impl<P, S> AccountDeletionService<P, S> {
    /// Create a new service with the purge repository and session store.
    pub const fn new(purge_repo: Arc<P>, sessions: Arc<S>) -> Self {
        Self {
            purge_repo,
            sessions,
        }
    }
}

impl<P, S> AccountDeletionService<P, S>
where
    P: AccountPurgeRepository,
    S: SessionStore,
{
    /// Delete `user`'s account and return the committed audit record.
    ///
    /// The caller observes a single typed failure when anything in the
    /// transactional sequence goes wrong; partial state is never visible.
    /// A missing account surfaces as `NotFound` and writes no audit record.
    pub async fn delete_account(&self, user: &UserId) -> Result<DeletionAudit, Error> {
        let audit = self
            .purge_repo
            .purge(user)
            .await
            .map_err(map_purge_error)?;

        // Session cleanup is not required for correctness of the purge.
        if let Err(error) = self.invalidate_sessions(user).await {
            warn!(user_id = %user, error = %error, "session invalidation failed after deletion");
        }

        Ok(audit)
    }

    async fn invalidate_sessions(&self, user: &UserId) -> Result<(), SessionStoreError> {
        self.sessions.delete(&session_key(user)).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "account_deletion_service_tests.rs"]
mod tests;
