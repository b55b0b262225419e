//! Tests for the account deletion service.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockAccountPurgeRepository, MockSessionStore};
use crate::domain::ErrorCode;

fn audit_for(user: UserId) -> DeletionAudit {
    DeletionAudit {
        id: Uuid::new_v4(),
        user_id: user,
        deleted_at: Utc::now(),
        ratings_count: 3,
        reviews_count: 1,
        follows_count: 4,
    }
}

#[tokio::test]
async fn delete_account_purges_and_invalidates_the_session() {
    let user = UserId::random();
    let expected = audit_for(user);

    let mut purge = MockAccountPurgeRepository::new();
    let returned = expected.clone();
    purge
        .expect_purge()
        .withf(move |id| *id == user)
        .times(1)
        .return_once(move |_| Ok(returned));

    let mut sessions = MockSessionStore::new();
    let key = format!("session:{user}");
    sessions
        .expect_delete()
        .withf(move |candidate| candidate == key)
        .times(1)
        .return_once(|_| Ok(true));

    let service = AccountDeletionService::new(Arc::new(purge), Arc::new(sessions));
    let audit = service
        .delete_account(&user)
        .await
        .expect("deletion succeeds");

    assert_eq!(audit, expected);
}

#[tokio::test]
async fn deleting_an_unknown_account_is_not_found() {
    let mut purge = MockAccountPurgeRepository::new();
    purge
        .expect_purge()
        .times(1)
        .return_once(|_| Err(AccountPurgeError::UserMissing));

    let mut sessions = MockSessionStore::new();
    sessions.expect_delete().times(0);

    let service = AccountDeletionService::new(Arc::new(purge), Arc::new(sessions));
    let error = service
        .delete_account(&UserId::random())
        .await
        .expect_err("unknown account");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "account not found");
}

#[tokio::test]
async fn a_failed_purge_surfaces_as_deletion_failed_and_skips_sessions() {
    let mut purge = MockAccountPurgeRepository::new();
    purge
        .expect_purge()
        .times(1)
        .return_once(|_| Err(AccountPurgeError::query("anonymization update failed")));

    let mut sessions = MockSessionStore::new();
    sessions.expect_delete().times(0);

    let service = AccountDeletionService::new(Arc::new(purge), Arc::new(sessions));
    let error = service
        .delete_account(&UserId::random())
        .await
        .expect_err("purge failed");

    assert_eq!(error.code(), ErrorCode::DeletionFailed);
}

#[tokio::test]
async fn session_store_failure_does_not_fail_the_deletion() {
    let user = UserId::random();
    let expected = audit_for(user);

    let mut purge = MockAccountPurgeRepository::new();
    let returned = expected.clone();
    purge
        .expect_purge()
        .times(1)
        .return_once(move |_| Ok(returned));

    let mut sessions = MockSessionStore::new();
    sessions
        .expect_delete()
        .times(1)
        .return_once(|_| Err(SessionStoreError::connection("redis unreachable")));

    let service = AccountDeletionService::new(Arc::new(purge), Arc::new(sessions));
    let audit = service
        .delete_account(&user)
        .await
        .expect("deletion still succeeds");

    assert_eq!(audit, expected);
}
