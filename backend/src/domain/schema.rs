//! Relational entity declarations contributed by feature modules.
//!
//! Feature modules describe the tables they depend on with static
//! [`EntitySchema`] values. The schema materialiser gathers these and asks the
//! bound persistence adapter to create whatever is missing.

/// One column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: &'static str,
    /// SQL type, e.g. `UUID` or `TIMESTAMPTZ`.
    pub sql_type: &'static str,
    /// Column constraints such as `NOT NULL` or `PRIMARY KEY`; may be empty.
    pub constraints: &'static str,
}

impl ColumnSpec {
    /// Build a column declaration.
    pub const fn new(name: &'static str, sql_type: &'static str, constraints: &'static str) -> Self {
        Self {
            name,
            sql_type,
            constraints,
        }
    }

    fn definition(&self) -> String {
        if self.constraints.is_empty() {
            format!("{} {}", self.name, self.sql_type)
        } else {
            format!("{} {} {}", self.name, self.sql_type, self.constraints)
        }
    }
}

/// Static description of an entity table.
///
/// # Examples
/// ```
/// use healix::domain::{ColumnSpec, EntitySchema};
///
/// const NOTES: EntitySchema = EntitySchema::new(
///     "notes",
///     &[
///         ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
///         ColumnSpec::new("body", "TEXT", "NOT NULL"),
///     ],
/// );
/// assert_eq!(
///     NOTES.create_table_sql(),
///     "CREATE TABLE IF NOT EXISTS notes (id UUID PRIMARY KEY, body TEXT NOT NULL)"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    table: &'static str,
    columns: &'static [ColumnSpec],
}

impl EntitySchema {
    /// Declare a table and its columns.
    pub const fn new(table: &'static str, columns: &'static [ColumnSpec]) -> Self {
        Self { table, columns }
    }

    /// Table name.
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Column declarations in table order.
    pub const fn columns(&self) -> &'static [ColumnSpec] {
        self.columns
    }

    /// Idempotent DDL statement creating the table.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnSpec::definition)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({columns})", self.table)
    }
}

/// Outcome of a schema materialisation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Tables created by this pass, in declaration order.
    pub created: Vec<String>,
    /// Tables that already existed and were left untouched.
    pub existing: Vec<String>,
}

impl SchemaReport {
    /// Every table known after the pass, created ones first.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.created
            .iter()
            .chain(self.existing.iter())
            .map(String::as_str)
    }
}
