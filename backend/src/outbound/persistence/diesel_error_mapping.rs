//! Shared Diesel error mapping for repositories with basic query semantics.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Captures the mapping repeated across repositories: `NotFound` and
/// query-builder failures become query errors, closed connections become
/// connection errors, and everything else collapses to a generic query
/// error after the details are logged at debug level.
pub(super) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Whether the error is a unique constraint violation.
pub(super) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum SampleError {
        Query(&'static str),
        Connection(String),
    }

    fn static_connection(message: &'static str) -> SampleError {
        SampleError::Connection(message.to_string())
    }

    #[rstest]
    fn pool_errors_carry_their_message_into_the_connection_variant() {
        let mapped = map_basic_pool_error(
            PoolError::checkout("connection refused"),
            SampleError::Connection,
        );
        assert_eq!(
            mapped,
            SampleError::Connection("connection refused".to_string())
        );
    }

    #[rstest]
    fn not_found_maps_to_a_query_error() {
        let mapped = map_basic_diesel_error(
            diesel::result::Error::NotFound,
            SampleError::Query,
            static_connection,
        );
        assert_eq!(mapped, SampleError::Query("record not found"));
    }

    #[rstest]
    fn broken_pipe_maps_to_a_query_error_by_default() {
        let mapped = map_basic_diesel_error(
            diesel::result::Error::RollbackTransaction,
            SampleError::Query,
            static_connection,
        );
        assert_eq!(mapped, SampleError::Query("database error"));
    }

    #[rstest]
    fn unique_violations_are_recognised() {
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_string()),
        );
        assert!(is_unique_violation(&error));
        assert!(!is_unique_violation(&diesel::result::Error::NotFound));
    }
}
