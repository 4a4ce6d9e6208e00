//! Shared application state for the livetrack gateway.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::presence::{HubHandle, PresenceHub};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    hub: HubHandle,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state; spawns the presence hub task.
    pub fn new(cfg: GatewayConfig) -> Self {
        let (hub, _task) = PresenceHub::spawn();
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            hub,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }
}
