//! Server settings loaded via OrthoConfig.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PROFILE: &str = "development";
const DEFAULT_PORT: u16 = 8080;

/// Process-level server options: which settings profile to boot and where to
/// listen.
///
/// Read from `HEALIX_*` environment variables or the matching CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HEALIX")]
pub struct ServerSettings {
    /// Settings profile passed to the application factory.
    pub profile: Option<String>,
    /// Listen address.
    pub host: Option<IpAddr>,
    /// Listen port.
    pub port: Option<u16>,
}

impl ServerSettings {
    /// Configured profile, `development` when unset.
    pub fn profile(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    /// Socket address to bind, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }
}
