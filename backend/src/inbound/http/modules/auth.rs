//! Authentication module.
//!
//! Credential checking happens elsewhere; this module exchanges refresh
//! tokens for access tokens and reports who the caller is.

use actix_web::{HttpRequest, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{ApiResult, ColumnSpec, EntitySchema, TokenKind};
use crate::inbound::http::auth::{Authenticated, token_error, verify_request};
use crate::inbound::http::state::HttpState;

use super::RouteModule;

const NAME: &str = "authentication";

/// Registered accounts.
pub const USERS: EntitySchema = EntitySchema::new(
    "users",
    &[
        ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
        ColumnSpec::new("email", "TEXT", "NOT NULL UNIQUE"),
        ColumnSpec::new("password_hash", "TEXT", "NOT NULL"),
        ColumnSpec::new("role", "TEXT", "NOT NULL DEFAULT 'user'"),
        ColumnSpec::new("created_at", "TIMESTAMPTZ", "NOT NULL DEFAULT now()"),
    ],
);

const ENTITIES: &[EntitySchema] = &[USERS];

/// Mounts `/api/auth`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationModule;

impl RouteModule for AuthenticationModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prefix(&self) -> &'static str {
        "/api/auth"
    }

    fn entities(&self) -> &'static [EntitySchema] {
        ENTITIES
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.route("/refresh", web::post().to(refresh))
            .route("/session", web::get().to(session));
    }
}

/// Freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    /// Encoded access token.
    pub access_token: String,
    /// Always `Bearer`.
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Instant after which the token is rejected.
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: DateTime<Utc>,
}

/// The caller's identity as carried by the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// Token subject.
    #[schema(example = "patient-7")]
    pub subject: String,
    /// Granted role.
    #[schema(example = "user")]
    pub role: String,
}

/// Exchange the refresh token in the `Authorization` header for an access
/// token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tags = ["auth"],
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Missing, expired, or non-refresh token", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<AccessTokenResponse>> {
    let principal = verify_request(&req, TokenKind::Refresh)?;
    let issued = state
        .tokens
        .issue(&principal, TokenKind::Access)
        .map_err(token_error)?;
    info!(subject = principal.subject(), "access token refreshed");
    Ok(web::Json(AccessTokenResponse {
        access_token: issued.token,
        token_type: "Bearer".to_owned(),
        expires_at: issued.expires_at,
    }))
}

/// Describe the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tags = ["auth"],
    responses(
        (status = 200, description = "Caller identity", body = SessionResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn session(auth: Authenticated) -> web::Json<SessionResponse> {
    let principal = auth.principal();
    web::Json(SessionResponse {
        subject: principal.subject().to_owned(),
        role: principal.role().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test};
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockTokenService, TokenError};
    use crate::domain::{IssuedToken, Principal, Role};

    fn mounted(tokens: MockTokenService) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::new(Arc::new(tokens))))
            .service(web::scope("/api/auth").configure(|cfg| AuthenticationModule.configure(cfg)))
    }

    fn principal() -> Principal {
        Principal::new("patient-7", Role::User).expect("valid principal")
    }

    #[rstest]
    #[actix_web::test]
    async fn refresh_issues_an_access_token() {
        let expires_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 15, 0)
            .single()
            .expect("valid timestamp");
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .withf(|_, kind| *kind == TokenKind::Refresh)
            .returning(|_, _| Ok(principal()));
        tokens
            .expect_issue()
            .withf(|_, kind| *kind == TokenKind::Access)
            .returning(move |_, kind| {
                Ok(IssuedToken {
                    token: "fresh".to_owned(),
                    kind,
                    expires_at,
                })
            });
        let app = test::init_service(mounted(tokens)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/refresh")
            .insert_header((AUTHORIZATION, "Bearer refresh-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: AccessTokenResponse = test::read_body_json(res).await;
        assert_eq!(body.access_token, "fresh");
        assert_eq!(body.token_type, "Bearer");
        assert_eq!(body.expires_at, expires_at);
    }

    #[rstest]
    #[actix_web::test]
    async fn refresh_rejects_access_tokens() {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(|_, kind| Err(TokenError::wrong_kind(kind.to_string())));
        tokens.expect_issue().times(0);
        let app = test::init_service(mounted(tokens)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/refresh")
            .insert_header((AUTHORIZATION, "Bearer access-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn session_reports_the_principal() {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().returning(|_, _| Ok(principal()));
        let app = test::init_service(mounted(tokens)).await;

        let req = test::TestRequest::get()
            .uri("/api/auth/session")
            .insert_header((AUTHORIZATION, "Bearer access-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: SessionResponse = test::read_body_json(res).await;
        assert_eq!(
            body,
            SessionResponse {
                subject: "patient-7".to_owned(),
                role: "user".to_owned(),
            }
        );
    }
}
