//! Bootstrap failures.
//!
//! These never reach the HTTP error envelope: a failed bootstrap aborts
//! start-up before any request is served.

use std::fmt;

use crate::config::ConfigurationError;
use crate::domain::ports::SchemaStoreError;
use crate::outbound::persistence::PoolError;

/// Failures of the persistence binding and schema materialisation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// Materialisation ran before any persistence was bound.
    #[error("persistence is not bound")]
    NotBound,
    /// The database could not be reached.
    #[error("database connection failed: {message}")]
    Connection { message: String },
    /// A catalogue query or DDL statement failed.
    #[error("schema query failed: {message}")]
    Query { message: String },
}

impl From<PoolError> for PersistenceError {
    fn from(error: PoolError) -> Self {
        Self::Connection {
            message: error.message().to_owned(),
        }
    }
}

impl From<SchemaStoreError> for PersistenceError {
    fn from(error: SchemaStoreError) -> Self {
        match error {
            SchemaStoreError::Connection { message } => Self::Connection { message },
            SchemaStoreError::Query { message } => Self::Query { message },
        }
    }
}

/// Milestones of application construction, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BootstrapStage {
    /// Handle allocated, nothing bound.
    Created,
    /// Settings resolved and validated for the requested profile.
    ConfiguredSettings,
    /// Persistence, token manager, and cross-origin policy attached.
    SubsystemsBound,
    /// Feature modules mounted under their prefixes.
    RoutesRegistered,
    /// Entity tables exist in the bound store.
    SchemaReady,
    /// Error translator installed; the handle is ready.
    ErrorHandlersInstalled,
}

impl BootstrapStage {
    /// Every stage, in order.
    pub const ALL: [Self; 6] = [
        Self::Created,
        Self::ConfiguredSettings,
        Self::SubsystemsBound,
        Self::RoutesRegistered,
        Self::SchemaReady,
        Self::ErrorHandlersInstalled,
    ];

    /// Stable name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ConfiguredSettings => "configured_settings",
            Self::SubsystemsBound => "subsystems_bound",
            Self::RoutesRegistered => "routes_registered",
            Self::SchemaReady => "schema_ready",
            Self::ErrorHandlersInstalled => "error_handlers_installed",
        }
    }

    /// Whether this is the final stage.
    pub fn is_ready(self) -> bool {
        self == Self::ErrorHandlersInstalled
    }
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a bootstrap failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapCause {
    /// Settings or route declarations are invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The persistence backend failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Application construction failed while entering `stage`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bootstrap failed before reaching {stage}: {cause}")]
pub struct BootstrapError {
    stage: BootstrapStage,
    #[source]
    cause: BootstrapCause,
}

impl BootstrapError {
    /// Record that entering `stage` failed with `cause`.
    pub fn new(stage: BootstrapStage, cause: impl Into<BootstrapCause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    /// Stage whose transition failed.
    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// Underlying failure.
    pub fn cause(&self) -> &BootstrapCause {
        &self.cause
    }

    /// Configuration failure, if that is the cause.
    pub fn configuration(&self) -> Option<&ConfigurationError> {
        match &self.cause {
            BootstrapCause::Configuration(error) => Some(error),
            BootstrapCause::Persistence(_) => None,
        }
    }

    /// Persistence failure, if that is the cause.
    pub fn persistence(&self) -> Option<&PersistenceError> {
        match &self.cause {
            BootstrapCause::Persistence(error) => Some(error),
            BootstrapCause::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn stages_are_ordered() {
        let mut sorted = BootstrapStage::ALL;
        sorted.sort();
        assert_eq!(sorted, BootstrapStage::ALL);
        assert!(BootstrapStage::ErrorHandlersInstalled.is_ready());
    }

    #[rstest]
    fn store_errors_keep_their_kind() {
        assert_eq!(
            PersistenceError::from(SchemaStoreError::connection("refused")),
            PersistenceError::Connection {
                message: "refused".to_owned()
            }
        );
        assert_eq!(
            PersistenceError::from(SchemaStoreError::query("syntax")),
            PersistenceError::Query {
                message: "syntax".to_owned()
            }
        );
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let err = PersistenceError::from(PoolError::build("timed out"));
        assert_eq!(err.to_string(), "database connection failed: timed out");
    }

    #[rstest]
    fn message_names_stage_and_cause() {
        let err = BootstrapError::new(
            BootstrapStage::ConfiguredSettings,
            ConfigurationError::MissingEnv {
                name: "DATABASE_URL",
            },
        );
        assert_eq!(err.stage(), BootstrapStage::ConfiguredSettings);
        assert!(err.configuration().is_some());
        assert!(
            err.to_string()
                .starts_with("bootstrap failed before reaching configured_settings")
        );
    }
}
