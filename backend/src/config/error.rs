//! Configuration failures raised while resolving profiles or wiring routes.

/// Errors raised by settings resolution, profile lookup, and route
/// registration.
///
/// These are bootstrap failures: they abort application construction and are
/// never translated into HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The requested profile name is not registered.
    #[error("unknown profile: {name}")]
    UnknownProfile { name: String },
    /// A variable required by the selected profile is absent.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A secret fell back to its development default in a profile that
    /// forbids it.
    #[error("{name} must be set explicitly for the production profile")]
    DefaultSecret { name: &'static str },
    /// Two route modules claimed the same prefix.
    #[error("duplicate route prefix: {prefix}")]
    DuplicateRoutePrefix { prefix: String },
    /// A route module declared a malformed prefix.
    #[error("invalid route prefix '{prefix}': {reason}")]
    InvalidRoutePrefix {
        prefix: String,
        reason: &'static str,
    },
}
