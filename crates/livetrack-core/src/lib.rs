//! livetrack core: transport-agnostic protocol types, geo validation, and
//! the shared error surface.
//!
//! This crate defines the wire-level contracts shared by the gateway and any
//! client tooling. It intentionally carries no transport or runtime
//! dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `LivetrackError`/`Result` so production
//! processes do not crash on malformed input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod geo;
pub mod protocol;

/// Shared result type.
pub use error::{LivetrackError, Result};
