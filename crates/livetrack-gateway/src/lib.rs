//! livetrack gateway library entry.
//!
//! This crate wires the transport, presence hub, HTTP API, and config into
//! a cohesive location-sharing gateway. It is intended to be consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod presence;
pub mod router;
pub mod transport;
