//! Ordered registration of feature modules.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::ConfigurationError;
use crate::domain::EntitySchema;
use crate::inbound::http::modules::RouteModule;

/// Modules mounted on an application, in registration order.
#[derive(Clone, Default)]
pub struct RouteTable {
    modules: Vec<Arc<dyn RouteModule>>,
}

impl RouteTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered modules, first registered first.
    pub fn modules(&self) -> &[Arc<dyn RouteModule>] {
        &self.modules
    }

    /// Registered prefixes in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.prefix())
    }

    /// Every entity declared by the registered modules, duplicates included.
    pub fn entities(&self) -> impl Iterator<Item = &'static EntitySchema> + '_ {
        self.modules.iter().flat_map(|module| module.entities().iter())
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        self.prefixes().any(|existing| existing == prefix)
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.prefixes()).finish()
    }
}

/// Validates and mounts feature modules.
///
/// Registration is all-or-nothing: if any module in a batch is rejected the
/// table is left as it was.
///
/// # Examples
/// ```
/// use healix::app::routes::{RouteRegistrar, RouteTable};
/// use healix::inbound::http::modules::default_modules;
///
/// let mut table = RouteTable::new();
/// RouteRegistrar::register(&mut table, default_modules()).expect("valid modules");
/// assert_eq!(table.prefixes().next(), Some("/api/auth"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRegistrar;

impl RouteRegistrar {
    /// Append `modules` to `table` in iteration order.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidRoutePrefix`] for a malformed prefix and
    /// [`ConfigurationError::DuplicateRoutePrefix`] for a prefix that is
    /// already taken.
    pub fn register(
        table: &mut RouteTable,
        modules: impl IntoIterator<Item = Arc<dyn RouteModule>>,
    ) -> Result<(), ConfigurationError> {
        let mut staged = table.clone();
        for module in modules {
            let prefix = module.prefix();
            validate_prefix(prefix)?;
            if staged.contains_prefix(prefix) {
                return Err(ConfigurationError::DuplicateRoutePrefix {
                    prefix: prefix.to_owned(),
                });
            }
            staged.modules.push(module);
        }

        for module in staged.modules.iter().skip(table.len()) {
            info!(module = module.name(), prefix = module.prefix(), "module registered");
        }
        *table = staged;
        Ok(())
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ConfigurationError> {
    let reason = if !prefix.starts_with('/') {
        Some("must start with '/'")
    } else if prefix.ends_with('/') {
        Some("must not end with '/'")
    } else if prefix.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigurationError::InvalidRoutePrefix {
            prefix: prefix.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Distinct entity tables, first declaration winning.
pub(crate) fn unique_entities<'a>(
    entities: impl IntoIterator<Item = &'a EntitySchema>,
) -> Vec<&'a EntitySchema> {
    let mut seen = BTreeSet::new();
    entities
        .into_iter()
        .filter(|entity| seen.insert(entity.table()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use actix_web::web;
    use rstest::rstest;

    use crate::domain::ColumnSpec;
    use crate::inbound::http::modules::default_modules;

    pub(crate) const NOTES: EntitySchema =
        EntitySchema::new("notes", &[ColumnSpec::new("id", "UUID", "PRIMARY KEY")]);
    pub(crate) const NOTES_AGAIN: EntitySchema = EntitySchema::new(
        "notes",
        &[ColumnSpec::new("id", "BIGINT", "PRIMARY KEY")],
    );
    const TAGS: EntitySchema =
        EntitySchema::new("tags", &[ColumnSpec::new("label", "TEXT", "NOT NULL")]);

    /// Module with a fixed prefix and entities, mounting nothing.
    pub(crate) struct StubModule {
        pub(crate) prefix: &'static str,
        pub(crate) entities: &'static [EntitySchema],
    }

    impl RouteModule for StubModule {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn prefix(&self) -> &'static str {
            self.prefix
        }

        fn entities(&self) -> &'static [EntitySchema] {
            self.entities
        }

        fn configure(&self, _cfg: &mut web::ServiceConfig) {}
    }

    pub(crate) fn stub(
        prefix: &'static str,
        entities: &'static [EntitySchema],
    ) -> Arc<dyn RouteModule> {
        Arc::new(StubModule { prefix, entities })
    }

    #[rstest]
    fn default_modules_register_in_order() {
        let mut table = RouteTable::new();
        RouteRegistrar::register(&mut table, default_modules()).expect("valid modules");
        assert_eq!(table.len(), 5);
        assert_eq!(
            table.prefixes().collect::<Vec<_>>(),
            vec![
                "/api/auth",
                "/api/biomarkers",
                "/api/appointments",
                "/api/admin",
                "/api/export"
            ]
        );
    }

    #[rstest]
    fn duplicate_prefixes_are_rejected_atomically() {
        let mut table = RouteTable::new();
        let err = RouteRegistrar::register(
            &mut table,
            vec![stub("/api/notes", &[]), stub("/api/tags", &[]), stub("/api/notes", &[])],
        )
        .expect_err("duplicate prefix");

        assert_eq!(
            err,
            ConfigurationError::DuplicateRoutePrefix {
                prefix: "/api/notes".to_owned()
            }
        );
        assert_eq!(err.to_string(), "duplicate route prefix: /api/notes");
        assert!(table.is_empty());
    }

    #[rstest]
    fn duplicates_are_detected_across_batches() {
        let mut table = RouteTable::new();
        RouteRegistrar::register(&mut table, vec![stub("/api/notes", &[])]).expect("first batch");
        let err = RouteRegistrar::register(&mut table, vec![stub("/api/notes", &[])])
            .expect_err("second batch");
        assert!(matches!(err, ConfigurationError::DuplicateRoutePrefix { .. }));
        assert_eq!(table.len(), 1);
    }

    #[rstest]
    #[case("api/notes", "must start with '/'")]
    #[case("", "must start with '/'")]
    #[case("/api/notes/", "must not end with '/'")]
    #[case("/", "must not end with '/'")]
    #[case("/api/my notes", "must not contain whitespace")]
    fn malformed_prefixes_are_rejected(#[case] prefix: &'static str, #[case] reason: &str) {
        let mut table = RouteTable::new();
        let err = RouteRegistrar::register(&mut table, vec![stub(prefix, &[])])
            .expect_err("malformed prefix");
        assert!(matches!(
            err,
            ConfigurationError::InvalidRoutePrefix { prefix: ref reported, reason: reported_reason }
                if reported == prefix && reported_reason == reason
        ));
    }

    #[rstest]
    fn first_declaration_of_a_table_wins() {
        let entities = [NOTES, TAGS, NOTES_AGAIN];
        let unique = unique_entities(entities.iter());
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], &NOTES);
        assert_eq!(unique[1], &TAGS);
    }
}
