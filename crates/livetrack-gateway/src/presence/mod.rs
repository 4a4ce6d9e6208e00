//! Presence core: the registry of live connections and the hub that owns it.
//!
//! The registry is plain synchronous state; the hub is the single task
//! allowed to mutate it, fed by a typed event queue.

pub mod hub;
pub mod registry;

pub use hub::{HubEvent, HubHandle, PresenceHub, RegistrySnapshot};
pub use registry::{ConnectionRecord, PresenceRegistry, UserSummary};
