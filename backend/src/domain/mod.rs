//! Domain primitives and ports.
//!
//! Purpose: keep transport and persistence concerns out of the types that
//! describe failures, identities, and entity tables. Inbound adapters map
//! these onto HTTP; outbound adapters implement the ports.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic failure and its category.
//! - TraceId — request-scoped correlation identifier.
//! - Principal, Role, TokenKind, IssuedToken — token identity.
//! - EntitySchema, ColumnSpec, SchemaReport — table declarations.

pub mod auth;
pub mod error;
pub mod ports;
pub mod schema;
pub mod trace_id;

pub use self::auth::{
    IssuedToken, Principal, PrincipalValidationError, Role, TokenKind, UnknownRole,
};
pub use self::error::{Error, ErrorCode, fallback_message};
pub use self::schema::{ColumnSpec, EntitySchema, SchemaReport};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use healix::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
