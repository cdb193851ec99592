//! Port for issuing and verifying bearer tokens.
//!
//! Inbound guards depend on this trait only, so handler tests can swap in a
//! double instead of signing real tokens.

use crate::domain::{IssuedToken, Principal, TokenKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token service adapters.
    pub enum TokenError {
        /// The token's expiry has passed.
        Expired =>
            "token has expired",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } =>
            "token is invalid: {message}",
        /// A token of another kind was presented.
        WrongKind { expected: String } =>
            "expected a {expected} token",
        /// Signing a new token failed.
        Signing { message: String } =>
            "token signing failed: {message}",
    }
}

/// Port for bearer token lifecycle operations.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a new token of `kind` for `principal`.
    fn issue(&self, principal: &Principal, kind: TokenKind) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and return its principal, requiring it to be of `kind`.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<Principal, TokenError>;
}
