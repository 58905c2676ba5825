//! pingstream core: transport-agnostic primitives shared by the gateway.
//!
//! This crate owns the per-address admission tracker, the measurement and
//! event payload types, and the error surface. It carries no transport or
//! runtime dependencies so the accounting logic can be tested on plain
//! threads.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A poisoned lock or an unserializable value surfaces as a denial or a
//! `PingStreamError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod admission;
pub mod error;
pub mod protocol;

pub use admission::{AdmissionSlot, AdmissionTracker};
pub use error::{PingStreamError, Result};
