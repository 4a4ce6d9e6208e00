//! Wire protocol (JSON text frames).
//!
//! Every frame is an externally tagged envelope `{"event": ..., "data": ...}`
//! with kebab-case event names. Client-to-server and server-to-client events
//! live in separate enums so each side can only emit its own vocabulary.
//!
//! All parsing is panic-free: malformed input is reported as
//! `LivetrackError::BadRequest` instead of panicking, keeping the gateway
//! resilient to hostile traffic.

pub mod client;
pub mod server;

pub use client::ClientEvent;
pub use server::ServerEvent;
