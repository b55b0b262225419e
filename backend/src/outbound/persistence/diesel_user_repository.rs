//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewUserRecord, UserRepository, UserRepositoryError};
use crate::domain::{CredentialHash, EmailAddress, User, UserId, UserProfile, Username};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, ProfileRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Map an insert failure, surfacing unique violations as duplicates.
fn map_insert_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserRepositoryError::duplicate_user(info.message())
        }
        other => map_diesel_error(other),
    }
}

/// Convert a stored row into the domain entity.
///
/// Stored values already passed domain validation on the way in, so a
/// conversion failure means the row was corrupted outside this crate.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| UserRepositoryError::query(format!("stored username invalid: {err}")))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;

    Ok(User::new(
        UserId::from_uuid(row.id),
        username,
        email,
        CredentialHash::new(row.credential_hash),
        row.created_at,
        row.updated_at,
    ))
}

pub(super) fn row_to_profile(row: ProfileRow) -> Result<UserProfile, String> {
    let username =
        Username::new(row.username).map_err(|err| format!("stored username invalid: {err}"))?;
    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        username,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *record.id.as_uuid(),
            username: record.username.as_ref(),
            email: record.email.as_ref(),
            credential_hash: record.credential_hash.as_str(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        row_to_user(row)
    }

    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = users::table
            .filter(users::id.eq(user.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_profile(row).map_err(UserRepositoryError::query))
            .transpose()
    }

    async fn exists(&self, user: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = users::table
            .filter(users::id.eq(user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_user() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates \"users_username_key\"".to_string()),
        );
        let repo_err = map_insert_error(diesel_err);

        assert!(matches!(repo_err, UserRepositoryError::DuplicateUser { .. }));
        assert!(repo_err.to_string().contains("users_username_key"));
    }

    #[rstest]
    fn corrupt_username_surfaces_as_query_error() {
        let row = UserRow {
            id: uuid::Uuid::new_v4(),
            username: "!!".to_string(),
            email: "ada@example.com".to_string(),
            credential_hash: "hash".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let error = row_to_user(row).expect_err("invalid stored username");
        assert!(matches!(error, UserRepositoryError::Query { .. }));
    }
}
