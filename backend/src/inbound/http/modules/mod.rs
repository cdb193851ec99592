//! Feature modules mounted under their own URL prefix.
//!
//! Each module contributes a prefix, the entity tables it depends on, and a
//! route configuration. The registrar validates prefixes and fixes the
//! mounting order; the schema materialiser reads the entities.

use std::sync::Arc;

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::EntitySchema;

use super::auth::Authenticated;

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod biomarkers;
pub mod export;

/// Contract between a feature module and the application factory.
pub trait RouteModule: Send + Sync {
    /// Human-readable module name used in logs and descriptors.
    fn name(&self) -> &'static str;

    /// Mount point, e.g. `/api/auth`. Must start with `/` and not end with one.
    fn prefix(&self) -> &'static str;

    /// Entity tables the module depends on.
    fn entities(&self) -> &'static [EntitySchema];

    /// Register the module's routes relative to its prefix.
    fn configure(&self, cfg: &mut web::ServiceConfig);
}

/// Modules every application mounts, in registration order.
pub fn default_modules() -> Vec<Arc<dyn RouteModule>> {
    vec![
        Arc::new(auth::AuthenticationModule),
        Arc::new(biomarkers::BiomarkerModule),
        Arc::new(appointments::AppointmentModule),
        Arc::new(admin::AdminModule),
        Arc::new(export::ExportModule),
    ]
}

/// Authenticated description of a mounted module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModuleDescriptor {
    /// Module name.
    #[schema(example = "biomarker data")]
    pub module: String,
    /// Subject of the caller's access token.
    #[schema(example = "patient-7")]
    pub subject: String,
}

impl ModuleDescriptor {
    pub(crate) fn for_caller(module: &str, auth: &Authenticated) -> Self {
        Self {
            module: module.to_owned(),
            subject: auth.principal().subject().to_owned(),
        }
    }
}
