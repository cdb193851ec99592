//! PostgreSQL-backed schema store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::domain::EntitySchema;
use crate::domain::ports::{SchemaStore, SchemaStoreError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;

const EXISTING_TABLES_SQL: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'";

#[derive(QueryableByName)]
struct TableNameRow {
    #[diesel(sql_type = Text)]
    table_name: String,
}

/// Diesel-backed implementation of the schema store port.
#[derive(Debug, Clone)]
pub struct PostgresSchemaStore {
    pool: DbPool,
    echo: bool,
}

impl PostgresSchemaStore {
    /// Create a store over `pool`.
    ///
    /// With `echo` set, every DDL statement is logged at `info` before it
    /// runs.
    pub fn new(pool: DbPool, echo: bool) -> Self {
        Self { pool, echo }
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SchemaStore for PostgresSchemaStore {
    async fn existing_tables(&self) -> Result<BTreeSet<String>, SchemaStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TableNameRow> = sql_query(EXISTING_TABLES_SQL)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(count = rows.len(), "read table catalogue");
        Ok(rows.into_iter().map(|row| row.table_name).collect())
    }

    async fn create_table(&self, entity: &EntitySchema) -> Result<(), SchemaStoreError> {
        let ddl = entity.create_table_sql();
        if self.echo {
            info!(table = entity.table(), sql = %ddl, "executing DDL");
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(ddl)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
