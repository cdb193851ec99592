//! Data export module.

use actix_web::web;

use crate::domain::{ColumnSpec, EntitySchema};
use crate::inbound::http::auth::Authenticated;

use super::{ModuleDescriptor, RouteModule};

const NAME: &str = "data export";

/// Queued patient data exports.
pub const EXPORT_JOBS: EntitySchema = EntitySchema::new(
    "export_jobs",
    &[
        ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
        ColumnSpec::new("requested_by", "UUID", "NOT NULL REFERENCES users(id)"),
        ColumnSpec::new("format", "TEXT", "NOT NULL"),
        ColumnSpec::new("status", "TEXT", "NOT NULL DEFAULT 'pending'"),
        ColumnSpec::new("created_at", "TIMESTAMPTZ", "NOT NULL DEFAULT now()"),
        ColumnSpec::new("completed_at", "TIMESTAMPTZ", ""),
    ],
);

const ENTITIES: &[EntitySchema] = &[EXPORT_JOBS];

/// Mounts `/api/export`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportModule;

impl RouteModule for ExportModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prefix(&self) -> &'static str {
        "/api/export"
    }

    fn entities(&self) -> &'static [EntitySchema] {
        ENTITIES
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.route("", web::get().to(describe));
    }
}

#[utoipa::path(
    get,
    path = "/api/export",
    tags = ["export"],
    responses(
        (status = 200, description = "Module descriptor", body = ModuleDescriptor),
        (status = 401, description = "Missing or invalid access token", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn describe(auth: Authenticated) -> web::Json<ModuleDescriptor> {
    web::Json(ModuleDescriptor::for_caller(NAME, &auth))
}
