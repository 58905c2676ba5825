//! Stream protocol types.
//!
//! A probe produces a [`Measurement`]; the transport turns each one into an
//! event payload `{"message": "<float> ms"}` carried in an SSE `data:` frame.

pub mod event;

pub use event::{Measurement, StreamEvent};
