//! Port for materialising entity tables in the active persistence backend.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::EntitySchema;

use super::define_port_error;

define_port_error! {
    /// Errors raised by schema store adapters.
    pub enum SchemaStoreError {
        /// Connection to the backing datastore failed.
        Connection { message: String } =>
            "schema store connection failed: {message}",
        /// A catalogue query or DDL statement failed.
        Query { message: String } =>
            "schema store query failed: {message}",
    }
}

/// Port for inspecting and creating entity tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Names of the tables that already exist.
    async fn existing_tables(&self) -> Result<BTreeSet<String>, SchemaStoreError>;

    /// Create `entity`'s table if it does not exist yet.
    async fn create_table(&self, entity: &EntitySchema) -> Result<(), SchemaStoreError>;
}
