//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use pingstream_core::error::{PingStreamError, Result};

pub use schema::{GatewayConfig, ProbeSection, ServerSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PINGSTREAM_CONFIG";
/// Config file used when `PINGSTREAM_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "pingstream.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<GatewayConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        PingStreamError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| PingStreamError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for the binary: `$PINGSTREAM_CONFIG`, else
/// `pingstream.yaml`, else built-in defaults when that file does not exist.
pub fn load_default() -> Result<GatewayConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(path);
    }
    match fs::read_to_string(DEFAULT_CONFIG_PATH) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
            Ok(GatewayConfig::default())
        }
        Err(e) => Err(PingStreamError::Internal(format!(
            "read config {DEFAULT_CONFIG_PATH} failed: {e}"
        ))),
    }
}
