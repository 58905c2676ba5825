//! pingstream gateway library entry.
//!
//! This crate wires config, admission, the probe engine, and the SSE
//! transport into a servable router. It is intended to be consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod obs;
pub mod ops;
pub mod probe;
pub mod router;
pub mod transport;
