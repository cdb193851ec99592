//! PostgreSQL persistence adapters using Diesel with `diesel-async` and `bb8`.
//!
//! Repository code stays thin: adapters translate between the schema store
//! port and SQL, mapping driver failures onto [`SchemaStoreError`].
//!
//! [`SchemaStoreError`]: crate::domain::ports::SchemaStoreError

mod error_mapping;
mod in_memory_schema_store;
mod pool;
mod postgres_schema_store;

pub use in_memory_schema_store::InMemorySchemaStore;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgres_schema_store::PostgresSchemaStore;
