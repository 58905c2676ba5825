//! Probe-and-stream engine, producer side.
//!
//! A [`Prober`] performs one timed fetch of the target. [`spawn_probe_loop`]
//! runs probes back to back on a background task and hands each measurement
//! to the stream consumer through a capacity-one channel.

pub mod engine;
pub mod http;
pub mod target;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

pub use engine::{spawn_probe_loop, ProbeExit, ProbeLoop};
pub use http::HttpProber;
pub use target::parse_target;

/// A fetch that completed, whatever its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: u16,
}

/// Transport-level failure: the request never completed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("connect: {0}")]
    Connect(String),
    #[error("transport: {0}")]
    Transport(String),
}

/// One fetch of a target URL.
///
/// Non-success statuses are still a completed probe; only failures to get a
/// response at all are errors.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, target: &Url) -> Result<ProbeOutcome, ProbeError>;
}
