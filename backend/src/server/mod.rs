//! HTTP server start-up around a bootstrapped application.

mod config;

pub use config::ServerSettings;

use std::net::SocketAddr;

use actix_web::HttpServer;
use actix_web::dev::Server;
use tracing::info;

use healix::app::{Application, build_app};

/// Bind an HTTP server serving `app` on `bind_addr`.
///
/// Every worker builds its own `App` from a clone of the handle, so the pool,
/// token manager, and health state are shared. Readiness flips once the
/// socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(app: Application, bind_addr: SocketAddr) -> std::io::Result<Server> {
    let health = app.health().clone();
    let worker_app = app.clone();
    let server = HttpServer::new(move || build_app(&worker_app))
        .bind(bind_addr)?
        .run();

    health.mark_ready();
    info!(
        profile = %app.settings().profile(),
        %bind_addr,
        modules = app.routes().len(),
        "server listening"
    );
    Ok(server)
}
