//! Lightweight in-process metrics.
//!
//! Counters and the latency histogram are plain atomics (labelled ones keyed
//! through `DashMap`) and are rendered in Prometheus text format by the
//! `/metrics` handler.

pub mod metrics;

pub use metrics::GatewayMetrics;
