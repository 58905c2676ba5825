use std::net::IpAddr;
use std::sync::Arc;

use reqwest::Url;
use tracing::Span;

use pingstream_core::protocol::Measurement;
use pingstream_core::AdmissionSlot;

use crate::obs::GatewayMetrics;

/// Immutable metadata for one accepted stream.
#[derive(Debug, Clone)]
pub struct SessionMeta {
    /// Caller address (admission key).
    pub client: IpAddr,
    /// Probed URL.
    pub target: Url,
}

/// How a session reached `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Producer hit a transport failure.
    TargetFailed,
    /// Stream dropped by the server connection (client went away).
    ClientGone,
    /// Server began draining.
    Shutdown,
    /// An event could not be serialized.
    EncodeFailed,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TargetFailed => "target_failed",
            EndReason::ClientGone => "client_gone",
            EndReason::Shutdown => "shutdown",
            EndReason::EncodeFailed => "encode_failed",
        }
    }
}

/// An admitted, streaming session. Dropping it terminates the session:
/// metrics are settled and the admission slot is released.
pub struct StreamSession {
    span: Span,
    metrics: Arc<GatewayMetrics>,
    delivered: u64,
    end: Option<EndReason>,
    _slot: AdmissionSlot,
}

impl StreamSession {
    pub fn open(meta: SessionMeta, slot: AdmissionSlot, metrics: Arc<GatewayMetrics>) -> Self {
        let span = tracing::info_span!("session", client = %meta.client, target = %meta.target);
        metrics.sessions_admitted.inc();
        metrics.sessions_active.inc();
        tracing::info!(
            parent: &span,
            remaining = slot.remaining(),
            limit = slot.limit(),
            "session admitted"
        );
        Self {
            span,
            metrics,
            delivered: 0,
            end: None,
            _slot: slot,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Account for one measurement handed to the client connection.
    pub fn record_delivery(&mut self, m: Measurement) {
        self.delivered += 1;
        self.metrics.probe_latency.observe_ms(m.as_millis());
        tracing::debug!(
            parent: &self.span,
            seq = self.delivered,
            ms = m.as_millis(),
            "measurement written"
        );
    }

    /// First reason wins.
    pub fn end(&mut self, reason: EndReason) {
        if self.end.is_none() {
            self.end = Some(reason);
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        // No recorded reason means the body was dropped under us.
        let reason = self.end.unwrap_or(EndReason::ClientGone);
        self.metrics.sessions_active.dec();
        self.metrics.sessions_ended.inc(reason.as_str());
        match reason {
            EndReason::EncodeFailed => tracing::warn!(
                parent: &self.span,
                reason = reason.as_str(),
                delivered = self.delivered,
                "session ended"
            ),
            _ => tracing::info!(
                parent: &self.span,
                reason = reason.as_str(),
                delivered = self.delivered,
                "session ended"
            ),
        }
    }
}
