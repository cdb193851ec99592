//! HTTP inbound adapter: error envelope, token guard, probes, and the
//! feature modules mounted by the application factory.

pub mod auth;
pub mod cors;
pub mod error;
pub mod health;
pub mod modules;
pub mod state;

pub use error::{ErrorEnvelope, ErrorTranslator};
