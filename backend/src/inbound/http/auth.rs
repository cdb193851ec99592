//! Bearer token guard for authenticated routes.
//!
//! Handlers take [`Authenticated`] as an argument; requests without a valid
//! access token never reach them and leave as an `unauthorized` envelope.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::ports::TokenError;
use crate::domain::{Error, Principal, TokenKind};

use super::state::HttpState;

/// Principal proven by a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(Principal);

impl Authenticated {
    /// Authenticated identity.
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    /// Unwrap the identity.
    pub fn into_inner(self) -> Principal {
        self.0
    }

    /// Require the administrator role.
    ///
    /// # Errors
    /// [`Error::forbidden`] for every other role.
    pub fn require_admin(&self) -> Result<&Principal, Error> {
        if self.0.is_admin() {
            Ok(&self.0)
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            verify_request(req, TokenKind::Access)
                .map(Self)
                .map_err(Into::into),
        )
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// # Errors
/// [`Error::unauthorized`] when the header is missing, not UTF-8, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    match value.trim().split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(Error::unauthorized("expected a bearer token")),
    }
}

/// Verify the request's bearer token as `kind`.
pub(crate) fn verify_request(req: &HttpRequest, kind: TokenKind) -> Result<Principal, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::service_unavailable("token manager is not bound"))?;
    let token = bearer_token(req)?;
    state.tokens.verify(token, kind).map_err(token_error)
}

/// Map token failures to request errors.
pub(crate) fn token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { .. } => Error::internal(error.to_string()),
        other => Error::unauthorized(other.to_string()),
    }
}
