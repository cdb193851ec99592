//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod schema_store;
mod token_service;

#[cfg(test)]
pub use schema_store::MockSchemaStore;
pub use schema_store::{SchemaStore, SchemaStoreError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
