//! Top-level facade crate for livetrack.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use livetrack_core::*;
}

pub mod gateway {
    pub use livetrack_gateway::*;
}
