//! Authentication primitives shared by the token manager and HTTP guards.
//!
//! Credential checking lives outside this crate; what remains here is the
//! identity carried inside bearer tokens.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purpose of a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for fresh access tokens.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// Coarse authorisation role embedded in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Patient or clinician using the regular API surface.
    User,
    /// Operator allowed onto administrative routes.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Validation failures for [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalValidationError {
    /// Subject was blank once trimmed.
    #[error("token subject must not be empty")]
    EmptySubject,
}

/// Authenticated identity carried by a token.
///
/// ## Invariants
/// - `subject` is trimmed and non-empty.
///
/// # Examples
/// ```
/// use healix::domain::{Principal, Role};
///
/// let principal = Principal::new(" patient-7 ", Role::User).unwrap();
/// assert_eq!(principal.subject(), "patient-7");
/// assert!(!principal.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    role: Role,
}

impl Principal {
    /// Validate and construct a principal.
    pub fn new(subject: &str, role: Role) -> Result<Self, PrincipalValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(PrincipalValidationError::EmptySubject);
        }
        Ok(Self {
            subject: subject.to_owned(),
            role,
        })
    }

    /// Stable subject identifier.
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Role granted to the subject.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the principal may use administrative routes.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Signed token handed back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Purpose of the token.
    pub kind: TokenKind,
    /// Instant after which verification fails.
    pub expires_at: DateTime<Utc>,
}
