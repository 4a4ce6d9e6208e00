//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the per-connection session loop that
//! decodes frames once before they reach the presence hub.

pub mod ws;
