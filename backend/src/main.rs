//! Backend entry-point: resolves the settings profile, bootstraps the
//! application, and serves it.

mod server;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use healix::app::{AppContext, create_app};
use server::{ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv = dotenvy::dotenv();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load environment file"),
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("invalid server settings: {e}")))?;
    let ctx = AppContext::from_env(&DefaultEnv::new())
        .map_err(|e| std::io::Error::other(format!("invalid environment: {e}")))?;
    let app = create_app(&ctx, settings.profile())
        .await
        .map_err(std::io::Error::other)?;

    create_server(app, settings.bind_addr())?.await
}
