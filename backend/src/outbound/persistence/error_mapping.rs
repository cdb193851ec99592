//! Diesel and pool error mapping for the schema store adapter.

use tracing::debug;

use crate::domain::ports::SchemaStoreError;

use super::pool::PoolError;

/// Map pool errors to schema store connection errors.
pub fn map_pool_error(error: PoolError) -> SchemaStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            SchemaStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to schema store errors.
///
/// Closed connections become connection errors; everything else is reported
/// as a query failure carrying the driver message.
pub fn map_diesel_error(error: diesel::result::Error) -> SchemaStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            debug!(message = info.message(), "schema store lost its connection");
            SchemaStoreError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "schema store query failed");
            SchemaStoreError::query(info.message().to_owned())
        }
        other => {
            debug!(error = %other, "schema store operation failed");
            SchemaStoreError::query(other.to_string())
        }
    }
}
