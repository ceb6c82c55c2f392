//! Mapping from pool and Diesel failures to [`LedgerStoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::LedgerStoreError;

use super::pool::PoolError;

/// Map pool errors to ledger store errors.
pub(crate) fn map_pool_error(error: PoolError) -> LedgerStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerStoreError::connection(message)
        }
    }
}

impl From<DieselError> for LedgerStoreError {
    fn from(error: DieselError) -> Self {
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
            DieselError::NotFound => LedgerStoreError::query("record not found"),
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                LedgerStoreError::connection("database connection error")
            }
            DieselError::DatabaseError(_, _) => LedgerStoreError::query("database error"),
            _ => LedgerStoreError::query("database error"),
        }
    }
}
