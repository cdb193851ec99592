//! HS256 bearer token manager.
//!
//! Tokens carry the subject, role, and purpose of the principal. Expiry is
//! checked against the injected [`Clock`] rather than the system time so the
//! lifetimes configured on a profile can be exercised deterministically.

use std::fmt;
use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Secret, Settings, TokenLifetimes};
use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{IssuedToken, Principal, Role, TokenKind};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    kind: TokenKind,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Token service signing with a shared secret.
pub struct JwtTokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
}

impl JwtTokenManager {
    /// Create a manager signing with `secret`.
    pub fn new(secret: &Secret, lifetimes: TokenLifetimes, clock: Arc<dyn Clock>) -> Self {
        let bytes = secret.expose().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            lifetimes,
            clock,
        }
    }

    /// Create a manager from a profile's secret and lifetimes, reading the
    /// system clock.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.jwt_secret(),
            settings.token_lifetimes(),
            Arc::new(DefaultClock),
        )
    }

    /// Lifetimes applied to newly issued tokens.
    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    fn lifetime(&self, kind: TokenKind) -> std::time::Duration {
        match kind {
            TokenKind::Access => self.lifetimes.access,
            TokenKind::Refresh => self.lifetimes.refresh,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the injected clock below.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl fmt::Debug for JwtTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenManager")
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}

impl TokenService for JwtTokenManager {
    fn issue(&self, principal: &Principal, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        let now = self.clock.utc();
        let ttl = TimeDelta::from_std(self.lifetime(kind))
            .map_err(|err| TokenError::signing(err.to_string()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::signing("token expiry overflows the calendar"))?;

        let claims = Claims {
            sub: principal.subject().to_owned(),
            role: principal.role(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            kind,
            expires_at,
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Principal, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| TokenError::invalid(err.to_string()))?
            .claims;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        if claims.kind != kind {
            return Err(TokenError::wrong_kind(kind.to_string()));
        }
        Principal::new(&claims.sub, claims.role).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
