//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: schema stores backed by PostgreSQL or process memory.
//! - **tokens**: HS256 bearer token signing and verification.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod persistence;
pub mod tokens;
