//! Creates the entity tables declared by registered modules.

use tracing::{debug, info};

use crate::domain::ports::SchemaStore;
use crate::domain::{EntitySchema, SchemaReport};

use super::PersistenceError;
use super::routes::unique_entities;

/// Drives a [`SchemaStore`] until every declared table exists.
pub struct SchemaMaterializer<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> SchemaMaterializer<'a> {
    /// Materialise into `store`.
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Create every table in `entities` that the store does not have yet.
    ///
    /// Tables are visited in declaration order; when two entities share a
    /// table name the first declaration wins. Existing tables are left
    /// untouched.
    ///
    /// # Errors
    /// [`PersistenceError::Connection`] or [`PersistenceError::Query`] when the
    /// store fails. Tables created before the failure remain.
    pub async fn materialize<'e>(
        &self,
        entities: impl IntoIterator<Item = &'e EntitySchema>,
    ) -> Result<SchemaReport, PersistenceError> {
        let existing = self.store.existing_tables().await?;
        let mut report = SchemaReport::default();

        for entity in unique_entities(entities) {
            let table = entity.table();
            if existing.contains(table) {
                debug!(table, "table already present");
                report.existing.push(table.to_owned());
                continue;
            }
            self.store.create_table(entity).await?;
            report.created.push(table.to_owned());
        }

        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            "schema materialised"
        );
        Ok(report)
    }
}
