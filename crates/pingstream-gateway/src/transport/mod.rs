//! Transport layer (HTTP + Server-Sent Events).
//!
//! Exposes the stream endpoint handler and the mapping from request errors
//! to JSON rejections.

pub mod error;
pub mod sse;

pub use error::ApiError;
