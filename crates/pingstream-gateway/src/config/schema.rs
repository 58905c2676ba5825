use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use pingstream_core::error::{PingStreamError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub probe: ProbeSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            probe: ProbeSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PingStreamError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.probe.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Concurrent streams allowed per client address.
    #[serde(default = "default_max_connections_per_ip")]
    pub max_connections_per_ip: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_connections_per_ip: default_max_connections_per_ip(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=10_000).contains(&self.max_connections_per_ip) {
            return Err(PingStreamError::BadRequest(
                "server.max_connections_per_ip must be between 1 and 10000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            PingStreamError::BadRequest(format!(
                "server.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_connections_per_ip() -> usize {
    10
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Whole-request timeout for one probe. Unset leaves the HTTP client's
    /// own behavior in place.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ProbeSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(ms) = self.timeout_ms {
            if !(100..=600_000).contains(&ms) {
                return Err(PingStreamError::BadRequest(
                    "probe.timeout_ms must be between 100 and 600000".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
