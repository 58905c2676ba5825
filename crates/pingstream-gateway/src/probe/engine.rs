//! Background probe loop.
//!
//! Each iteration reserves the single handoff slot before probing, so a new
//! probe starts only once the consumer has taken the previous measurement.
//! A slow client therefore throttles the probe rate. The loop ends on the
//! first transport failure or as soon as the consumer side is dropped, even
//! mid-probe.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

use pingstream_core::protocol::Measurement;

use super::Prober;

/// Measurements in flight between producer and consumer.
pub const HANDOFF_CAPACITY: usize = 1;

/// Why a probe loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeExit {
    /// A fetch failed at the transport level.
    TargetFailed,
    /// The receiver was dropped (client gone or stream torn down).
    ConsumerGone,
}

/// Handle to a running probe loop.
pub struct ProbeLoop {
    pub measurements: mpsc::Receiver<Measurement>,
    pub task: JoinHandle<ProbeExit>,
}

/// Start probing `target` on a new task, inheriting the caller's span.
pub fn spawn_probe_loop(prober: Arc<dyn Prober>, target: Url) -> ProbeLoop {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let task = tokio::spawn(run_probe_loop(prober, target, tx).in_current_span());
    ProbeLoop {
        measurements: rx,
        task,
    }
}

async fn run_probe_loop(
    prober: Arc<dyn Prober>,
    target: Url,
    tx: mpsc::Sender<Measurement>,
) -> ProbeExit {
    let mut delivered: u64 = 0;

    loop {
        let Ok(permit) = tx.reserve().await else {
            tracing::debug!(delivered, "consumer gone, probe loop stopping");
            return ProbeExit::ConsumerGone;
        };

        let started = Instant::now();
        let outcome = tokio::select! {
            res = prober.probe(&target) => Some(res),
            _ = tx.closed() => None,
        };

        match outcome {
            Some(Ok(res)) => {
                let m = Measurement::from_elapsed(started.elapsed());
                tracing::trace!(status = res.status, ms = m.as_millis(), "probe completed");
                permit.send(m);
                delivered += 1;
            }
            Some(Err(e)) => {
                tracing::info!(error = %e, delivered, "probe failed, ending stream");
                return ProbeExit::TargetFailed;
            }
            None => {
                tracing::debug!(delivered, "consumer gone mid-probe, probe loop stopping");
                return ProbeExit::ConsumerGone;
            }
        }
    }
}
