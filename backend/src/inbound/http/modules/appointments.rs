//! Appointment scheduling module.

use actix_web::web;

use crate::domain::{ColumnSpec, EntitySchema};
use crate::inbound::http::auth::Authenticated;

use super::{ModuleDescriptor, RouteModule};

const NAME: &str = "appointment scheduling";

/// Booked consultations between patients and clinicians.
pub const APPOINTMENTS: EntitySchema = EntitySchema::new(
    "appointments",
    &[
        ColumnSpec::new("id", "UUID", "PRIMARY KEY"),
        ColumnSpec::new("patient_id", "UUID", "NOT NULL REFERENCES users(id)"),
        ColumnSpec::new("clinician_id", "UUID", "REFERENCES users(id)"),
        ColumnSpec::new("scheduled_for", "TIMESTAMPTZ", "NOT NULL"),
        ColumnSpec::new("status", "TEXT", "NOT NULL DEFAULT 'scheduled'"),
        ColumnSpec::new("notes", "TEXT", ""),
    ],
);

const ENTITIES: &[EntitySchema] = &[APPOINTMENTS];

/// Mounts `/api/appointments`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentModule;

impl RouteModule for AppointmentModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prefix(&self) -> &'static str {
        "/api/appointments"
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
    path = "/api/appointments",
    tags = ["appointments"],
    responses(
        (status = 200, description = "Module descriptor", body = ModuleDescriptor),
        (status = 401, description = "Missing or invalid access token", body = crate::inbound::http::error::ErrorEnvelope)
    )
)]
pub async fn describe(auth: Authenticated) -> web::Json<ModuleDescriptor> {
    web::Json(ModuleDescriptor::for_caller(NAME, &auth))
}
