//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the health probes, the authentication endpoints, and
//! the module descriptors, together with the uniform error envelope and the
//! bearer-token security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ErrorCode;
use crate::inbound::http::ErrorEnvelope;
use crate::inbound::http::modules::ModuleDescriptor;
use crate::inbound::http::modules::auth::{AccessTokenResponse, SessionResponse};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description = Some("Access token; `/api/auth/refresh` takes a refresh token.".to_owned());
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Healix API",
        description = "Health-data services: authentication, biomarkers, appointments, export, and administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::modules::auth::refresh,
        crate::inbound::http::modules::auth::session,
        crate::inbound::http::modules::biomarkers::describe,
        crate::inbound::http::modules::appointments::describe,
        crate::inbound::http::modules::admin::describe,
        crate::inbound::http::modules::export::describe,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCode,
        ModuleDescriptor,
        AccessTokenResponse,
        SessionResponse
    )),
    tags(
        (name = "health", description = "Endpoints for health checks"),
        (name = "auth", description = "Token refresh and session introspection"),
        (name = "biomarkers", description = "Biomarker readings"),
        (name = "appointments", description = "Appointment scheduling"),
        (name = "admin", description = "Administrator-only operations"),
        (name = "export", description = "Data export jobs")
    )
)]
pub struct ApiDoc;
