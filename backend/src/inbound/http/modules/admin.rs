//! Administrative operations module.
//!
//! Every route requires the `admin` role on top of a valid access token.

use actix_web::web;

use crate::domain::{ApiResult, ColumnSpec, EntitySchema};
use crate::inbound::http::auth::Authenticated;

use super::{ModuleDescriptor, RouteModule};

const NAME: &str = "administrative operations";

/// Append-only record of administrative actions.
pub const AUDIT_EVENTS: EntitySchema = EntitySchema::new(
    "audit_events",
    &[
        ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
        ColumnSpec::new("actor_id", "UUID", "REFERENCES users(id)"),
        ColumnSpec::new("action", "TEXT", "NOT NULL"),
        ColumnSpec::new("detail", "JSONB", "NOT NULL DEFAULT '{}'"),
        ColumnSpec::new("occurred_at", "TIMESTAMPTZ", "NOT NULL DEFAULT now()"),
    ],
);

const ENTITIES: &[EntitySchema] = &[AUDIT_EVENTS];

/// Mounts `/api/admin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminModule;

impl RouteModule for AdminModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prefix(&self) -> &'static str {
        "/api/admin"
    }

    fn entities(&self) -> &'static [EntitySchema] {
        ENTITIES
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.route("", web::get().to(describe));
    }
}

/// Describe the admin module; callers must hold the `admin` role.
#[utoipa::path(
    get,
    path = "/api/admin",
    tags = ["admin"],
    responses(
        (status = 200, description = "Module descriptor", body = ModuleDescriptor),
        (status = 401, description = "Missing or invalid access token", body = crate::inbound::http::error::ErrorEnvelope),
        (status = 403, description = "Caller is not an administrator", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn describe(auth: Authenticated) -> ApiResult<web::Json<ModuleDescriptor>> {
    auth.require_admin()?;
    Ok(web::Json(ModuleDescriptor::for_caller(NAME, &auth)))
}
