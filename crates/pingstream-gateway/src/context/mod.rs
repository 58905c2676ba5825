//! Per-stream session context shared by transport and engine.
//!
//! A `StreamSession` is the unit of lifecycle: it holds the admission slot,
//! the tracing span, and the bookkeeping for how the stream ended.

pub mod session;

pub use session::{EndReason, SessionMeta, StreamSession};
