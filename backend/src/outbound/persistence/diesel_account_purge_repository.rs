//! PostgreSQL-backed `AccountPurgeRepository` implementation using Diesel ORM.
//!
//! The whole deletion sequence runs inside one transaction: existence
//! check, pre-mutation counts, audit insert, anonymization of ratings,
//! reviews, and activity events, follow edge removal in both directions,
//! and the user-row delete. A failed step rolls the whole thing back, so
//! a concurrent reader never observes a partially anonymized account. The
//! user-row delete is the authoritative existence check: a purge that
//! loses a race and deletes zero rows rolls back instead of committing a
//! second audit record.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{AccountPurgeError, AccountPurgeRepository};
use crate::domain::{DeletionAudit, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DeletionAuditRow, NewDeletionAuditRow};
use super::pool::{DbPool, PoolError};
use super::schema::{account_deletion_audit, activities, follows, ratings, reviews, users};

/// Diesel-backed implementation of the `AccountPurgeRepository` port.
#[derive(Clone)]
pub struct DieselAccountPurgeRepository {
    pool: DbPool,
}

impl DieselAccountPurgeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction-internal error; `Diesel` aborts with the underlying error,
/// `UserMissing` aborts with a clean rollback.
#[derive(Debug)]
enum PurgeTxError {
    Diesel(diesel::result::Error),
    UserMissing,
}

impl From<diesel::result::Error> for PurgeTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> AccountPurgeError {
    map_basic_pool_error(error, AccountPurgeError::connection)
}

/// Guard on the affected-row count of the final user-row delete.
///
/// Under read-committed two concurrent purges can both pass the initial
/// existence check; the loser's delete then affects zero rows. Aborting
/// here rolls its audit insert back, so exactly one audit record survives
/// per deletion.
fn ensure_user_row_deleted(rows: usize) -> Result<(), PurgeTxError> {
    if rows == 0 {
        return Err(PurgeTxError::UserMissing);
    }
    Ok(())
}

fn map_tx_error(error: PurgeTxError) -> AccountPurgeError {
    match error {
        PurgeTxError::UserMissing => AccountPurgeError::user_missing(),
        PurgeTxError::Diesel(error) => map_basic_diesel_error(
            error,
            AccountPurgeError::query,
            AccountPurgeError::connection,
        ),
    }
}

fn row_to_audit(row: DeletionAuditRow) -> DeletionAudit {
    DeletionAudit {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        deleted_at: row.deleted_at,
        ratings_count: u64::try_from(row.ratings_count).unwrap_or_default(),
        reviews_count: u64::try_from(row.reviews_count).unwrap_or_default(),
        follows_count: u64::try_from(row.follows_count).unwrap_or_default(),
    }
}

#[async_trait]
impl AccountPurgeRepository for DieselAccountPurgeRepository {
    async fn purge(&self, user: &UserId) -> Result<DeletionAudit, AccountPurgeError> {
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let audit_row = conn
            .transaction::<DeletionAuditRow, PurgeTxError, _>(|conn| {
                async move {
                    let present: i64 = users::table
                        .filter(users::id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if present == 0 {
                        return Err(PurgeTxError::UserMissing);
                    }

                    // Counts are taken before any mutation so the audit
                    // record reflects what the deletion touched.
                    let ratings_count: i64 = ratings::table
                        .filter(ratings::user_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    let reviews_count: i64 = reviews::table
                        .filter(reviews::user_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    let follows_count: i64 = follows::table
                        .filter(
                            follows::follower_id
                                .eq(user_id)
                                .or(follows::followee_id.eq(user_id)),
                        )
                        .count()
                        .get_result(conn)
                        .await?;

                    let audit_row: DeletionAuditRow =
                        diesel::insert_into(account_deletion_audit::table)
                            .values(&NewDeletionAuditRow {
                                id: Uuid::new_v4(),
                                user_id,
                                ratings_count,
                                reviews_count,
                                follows_count,
                            })
                            .returning(DeletionAuditRow::as_returning())
                            .get_result(conn)
                            .await?;

                    diesel::update(ratings::table.filter(ratings::user_id.eq(user_id)))
                        .set(ratings::user_id.eq(None::<Uuid>))
                        .execute(conn)
                        .await?;
                    diesel::update(reviews::table.filter(reviews::user_id.eq(user_id)))
                        .set(reviews::user_id.eq(None::<Uuid>))
                        .execute(conn)
                        .await?;
                    diesel::update(activities::table.filter(activities::user_id.eq(user_id)))
                        .set(activities::user_id.eq(None::<Uuid>))
                        .execute(conn)
                        .await?;

                    diesel::delete(
                        follows::table.filter(
                            follows::follower_id
                                .eq(user_id)
                                .or(follows::followee_id.eq(user_id)),
                        ),
                    )
                    .execute(conn)
                    .await?;

                    let deleted = diesel::delete(users::table.filter(users::id.eq(user_id)))
                        .execute(conn)
                        .await?;
                    ensure_user_row_deleted(deleted)?;

                    Ok(audit_row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        let audit = row_to_audit(audit_row);
        info!(
            user_id = %user,
            ratings = audit.ratings_count,
            reviews = audit.reviews_count,
            follows = audit.follows_count,
            "account purge committed"
        );
        Ok(audit)
    }
}
