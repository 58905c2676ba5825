//! Shared application state for the pingstream gateway.
//!
//! Holds the admission tracker (the only mutable state shared between
//! sessions), the prober, metrics, and the drain signal. Everything is built
//! from `GatewayConfig` at construction so tests can run with small ceilings.

use std::sync::Arc;

use tokio::sync::watch;

use pingstream_core::error::Result;
use pingstream_core::AdmissionTracker;

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::probe::{HttpProber, Prober};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    admission: Arc<AdmissionTracker>,
    prober: Arc<dyn Prober>,
    metrics: Arc<GatewayMetrics>,
    drain_tx: watch::Sender<bool>,
}

impl AppState {
    /// Build application state with the HTTP prober.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let prober = HttpProber::new(&cfg.probe)?;
        Ok(Self::with_prober(cfg, Arc::new(prober)))
    }

    /// Build application state around any prober.
    pub fn with_prober(cfg: GatewayConfig, prober: Arc<dyn Prober>) -> Self {
        let admission = Arc::new(AdmissionTracker::new(cfg.server.max_connections_per_ip));
        let (drain_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                admission,
                prober,
                metrics: Arc::new(GatewayMetrics::default()),
                drain_tx,
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn admission(&self) -> &Arc<AdmissionTracker> {
        &self.inner.admission
    }

    pub fn prober(&self) -> Arc<dyn Prober> {
        Arc::clone(&self.inner.prober)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Receiver that flips to `true` once draining starts.
    pub fn drain_signal(&self) -> watch::Receiver<bool> {
        self.inner.drain_tx.subscribe()
    }

    /// Enter draining: readiness fails and every open stream ends.
    pub fn begin_drain(&self) {
        self.inner.metrics.set_draining();
        self.inner.drain_tx.send_replace(true);
        tracing::info!("draining: closing open streams");
    }

    pub fn is_draining(&self) -> bool {
        *self.inner.drain_tx.borrow()
    }
}
