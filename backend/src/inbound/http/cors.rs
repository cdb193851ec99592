//! Cross-origin policy applied to every route.

use actix_cors::Cors;

/// Permissive cross-origin policy.
///
/// Any origin is echoed back, any method and header are accepted, and
/// credentials are not allowed. The policy is plain data so each HTTP worker
/// can build its own middleware from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    max_age_secs: usize,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            max_age_secs: 3600,
        }
    }
}

impl CorsPolicy {
    /// Policy allowing every origin, method, and header.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Build the actix middleware for this policy.
    pub fn middleware(&self) -> Cors {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(self.max_age_secs)
    }
}
