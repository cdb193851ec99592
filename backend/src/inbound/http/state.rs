//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without signing real tokens.

use std::sync::Arc;

use crate::domain::ports::TokenService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Token manager bound during bootstrap.
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Construct state around a token service.
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}
