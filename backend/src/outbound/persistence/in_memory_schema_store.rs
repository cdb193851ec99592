//! Process-local schema store used by the testing profile.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::EntitySchema;
use crate::domain::ports::{SchemaStore, SchemaStoreError};

/// Schema store keeping created tables in memory.
///
/// Nothing outlives the process, so every application built on the testing
/// profile starts from an empty catalogue.
#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    tables: Mutex<BTreeMap<String, String>>,
}

impl InMemorySchemaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// DDL recorded for `table`, if it has been created.
    pub fn ddl_for(&self, table: &str) -> Option<String> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
    }
}

fn poisoned() -> SchemaStoreError {
    SchemaStoreError::query("in-memory catalogue lock poisoned")
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn existing_tables(&self) -> Result<BTreeSet<String>, SchemaStoreError> {
        let tables = self.tables.lock().map_err(|_| poisoned())?;
        Ok(tables.keys().cloned().collect())
    }

    async fn create_table(&self, entity: &EntitySchema) -> Result<(), SchemaStoreError> {
        if entity.table().trim().is_empty() {
            return Err(SchemaStoreError::query("table name must not be empty"));
        }
        if entity.columns().is_empty() {
            return Err(SchemaStoreError::query(format!(
                "table {} declares no columns",
                entity.table()
            )));
        }
        let mut tables = self.tables.lock().map_err(|_| poisoned())?;
        tables
            .entry(entity.table().to_owned())
            .or_insert_with(|| entity.create_table_sql());
        Ok(())
    }
}
