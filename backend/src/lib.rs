//! Healix backend library: configuration profiles, the application factory,
//! and the HTTP and persistence adapters it wires together.

pub mod app;
pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
