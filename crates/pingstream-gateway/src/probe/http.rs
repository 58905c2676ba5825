//! reqwest-backed prober.

use async_trait::async_trait;
use reqwest::{Client, Url};

use pingstream_core::error::{PingStreamError, Result};

use super::{ProbeError, ProbeOutcome, Prober};
use crate::config::ProbeSection;

/// Issues a plain GET per probe over a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(cfg: &ProbeSection) -> Result<Self> {
        // Probes measure the target itself, never a proxy hop.
        let mut builder = Client::builder().no_proxy();
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PingStreamError::Internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Url) -> std::result::Result<ProbeOutcome, ProbeError> {
        // Latency is time to response head; the body is not read.
        let resp = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(ProbeOutcome {
            status: resp.status().as_u16(),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout(error.to_string())
    } else if error.is_connect() {
        ProbeError::Connect(error.to_string())
    } else {
        ProbeError::Transport(error.to_string())
    }
}
