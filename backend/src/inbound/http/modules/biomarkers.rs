//! Biomarker data module.

use actix_web::web;

use crate::domain::{ColumnSpec, EntitySchema};
use crate::inbound::http::auth::Authenticated;

use super::{ModuleDescriptor, RouteModule};

const NAME: &str = "biomarker data";

/// Lab and wearable readings per patient.
pub const BIOMARKER_READINGS: EntitySchema = EntitySchema::new(
    "biomarker_readings",
    &[
        ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
        ColumnSpec::new("user_id", "UUID", "NOT NULL REFERENCES users(id)"),
        ColumnSpec::new("marker", "TEXT", "NOT NULL"),
        ColumnSpec::new("value", "DOUBLE PRECISION", "NOT NULL"),
        ColumnSpec::new("unit", "TEXT", "NOT NULL"),
        ColumnSpec::new("recorded_at", "TIMESTAMPTZ", "NOT NULL"),
    ],
);

const ENTITIES: &[EntitySchema] = &[BIOMARKER_READINGS];

/// Mounts `/api/biomarkers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiomarkerModule;

impl RouteModule for BiomarkerModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prefix(&self) -> &'static str {
        "/api/biomarkers"
    }

    fn entities(&self) -> &'static [EntitySchema] {
        ENTITIES
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.route("", web::get().to(describe));
    }
}

/// Describe the biomarker module to an authenticated caller.
#[utoipa::path(
    get,
    path = "/api/biomarkers",
    tags = ["biomarkers"],
    responses(
        (status = 200, description = "Module descriptor", body = ModuleDescriptor),
        (status = 401, description = "Missing or invalid access token", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn describe(auth: Authenticated) -> web::Json<ModuleDescriptor> {
    web::Json(ModuleDescriptor::for_caller(NAME, &auth))
}
