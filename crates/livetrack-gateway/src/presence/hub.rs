//! Presence hub: the one task allowed to touch the registry.
//!
//! Every connection, identification, location, and disconnection flows
//! through a single typed event queue and is handled to completion before
//! the next one, so mutate-then-broadcast is atomic relative to other
//! events without any locking. HTTP reads go through the same queue as
//! snapshot requests.
//!
//! Egress is lossy `try_send`: a peer with a full outbound queue drops
//! frames instead of stalling the hub. Broadcasts go to every registered
//! connection including the originator; the client UI renders its own echo
//! through the same code path as peers.

use std::collections::HashMap;

use axum::extract::ws::Message;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use livetrack_core::error::{LivetrackError, Result};
use livetrack_core::geo::LocationReport;
use livetrack_core::protocol::ServerEvent;

use crate::presence::registry::{PresenceRegistry, UserSummary};

const EVENT_QUEUE_DEPTH: usize = 1024;

/// Typed events consumed by the hub, one at a time.
#[derive(Debug)]
pub enum HubEvent {
    Connect {
        id: String,
        tx: mpsc::Sender<Message>,
        /// Acceptance reply; a refused connect must not be treated as live
        /// by the transport (it would otherwise disconnect the original
        /// holder of the id on exit).
        accepted: oneshot::Sender<Result<()>>,
    },
    Identify {
        id: String,
        name: String,
    },
    Locate {
        id: String,
        report: LocationReport,
    },
    Disconnect {
        id: String,
    },
    /// Read-only view for the HTTP API; never broadcasts.
    Snapshot {
        reply: oneshot::Sender<RegistrySnapshot>,
    },
}

/// Immutable registry view handed out to readers.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub users: Vec<UserSummary>,
    pub count: usize,
}

/// Cloneable client side of the hub queue.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    /// Register a connection. `Err` means the id was refused (or the hub is
    /// gone); the caller must drop the socket without sending `Disconnect`,
    /// since the id still belongs to its original holder.
    pub async fn connect(&self, id: String, tx: mpsc::Sender<Message>) -> Result<()> {
        let (accepted, rx) = oneshot::channel();
        self.send(HubEvent::Connect { id, tx, accepted }).await?;
        rx.await
            .map_err(|_| LivetrackError::Transport("presence hub closed".into()))?
    }

    pub async fn identify(&self, id: String, name: String) -> Result<()> {
        self.send(HubEvent::Identify { id, name }).await
    }

    pub async fn locate(&self, id: String, report: LocationReport) -> Result<()> {
        self.send(HubEvent::Locate { id, report }).await
    }

    pub async fn disconnect(&self, id: String) -> Result<()> {
        self.send(HubEvent::Disconnect { id }).await
    }

    pub async fn snapshot(&self) -> Result<RegistrySnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Snapshot { reply }).await?;
        rx.await
            .map_err(|_| LivetrackError::Transport("presence hub closed".into()))
    }

    async fn send(&self, ev: HubEvent) -> Result<()> {
        self.tx
            .send(ev)
            .await
            .map_err(|_| LivetrackError::Transport("presence hub closed".into()))
    }
}

/// Hub task state: the registry plus the fan-out table. Both are owned
/// exclusively by the event loop.
pub struct PresenceHub {
    registry: PresenceRegistry,
    senders: HashMap<String, mpsc::Sender<Message>>,
}

impl PresenceHub {
    /// Spawn the hub task and return its handle.
    pub fn spawn() -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let hub = PresenceHub {
            registry: PresenceRegistry::new(),
            senders: HashMap::new(),
        };
        let task = tokio::spawn(hub.run(rx));
        (HubHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<HubEvent>) {
        while let Some(ev) = rx.recv().await {
            // Handlers are synchronous and infallible at this level; a
            // per-event fault is reported to the sender, never fatal.
            self.handle(ev);
        }
        tracing::info!("presence hub stopped");
    }

    fn handle(&mut self, ev: HubEvent) {
        match ev {
            HubEvent::Connect { id, tx, accepted } => self.on_connect(id, tx, accepted),
            HubEvent::Identify { id, name } => self.on_identify(&id, &name),
            HubEvent::Locate { id, report } => self.on_locate(&id, report),
            HubEvent::Disconnect { id } => self.on_disconnect(&id),
            HubEvent::Snapshot { reply } => {
                let _ = reply.send(RegistrySnapshot {
                    users: self.registry.summaries(),
                    count: self.registry.count(),
                });
            }
        }
    }

    fn on_connect(&mut self, id: String, tx: mpsc::Sender<Message>, accepted: oneshot::Sender<Result<()>>) {
        if let Err(err) = self.registry.register(&id, Utc::now()) {
            // Duplicate uuid means a server bug; refuse rather than clobber.
            // The refused session never becomes live, so its exit must not
            // evict the original holder of the id.
            tracing::error!(conn = %id, %err, "refusing duplicate connection id");
            self.send_to_sender(&tx, &ServerEvent::error_for(&err));
            let _ = accepted.send(Err(err));
            return;
        }
        self.senders.insert(id.clone(), tx);
        let _ = accepted.send(Ok(()));
        let count = self.registry.count();
        tracing::info!(conn = %id, count, "user connected");
        self.broadcast(&ServerEvent::UserCountUpdated { count });
    }

    fn on_identify(&mut self, id: &str, name: &str) {
        // Absent record or empty-after-trim name is a silent no-op.
        if let Some(stored) = self.registry.set_name(id, name) {
            tracing::info!(conn = %id, name = %stored, "user identified");
            self.broadcast(&ServerEvent::UserIdentified {
                id: id.to_string(),
                name: stored,
            });
        }
    }

    fn on_locate(&mut self, id: &str, report: LocationReport) {
        match self.registry.set_location(id, report, Utc::now()) {
            Ok(fix) => self.broadcast(&ServerEvent::received(id, &fix)),
            Err(err) => {
                // Rejected per-event: only the sender hears about it and the
                // registry is untouched. The client corrects itself on its
                // next periodic report.
                tracing::warn!(conn = %id, %err, "location update rejected");
                self.send_to(id, &ServerEvent::error_for(&err));
            }
        }
    }

    fn on_disconnect(&mut self, id: &str) {
        self.senders.remove(id);
        if self.registry.remove(id).is_none() {
            return;
        }
        let count = self.registry.count();
        tracing::info!(conn = %id, count, "user disconnected");
        self.broadcast(&ServerEvent::UserDisconnected(id.to_string()));
        self.broadcast(&ServerEvent::UserCountUpdated { count });
    }

    /// Serialize once, fan out to every registered connection.
    fn broadcast(&self, ev: &ServerEvent) {
        let frame = match ev.encode() {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(%err, "broadcast encode failed");
                return;
            }
        };
        for tx in self.senders.values() {
            let _ = tx.try_send(Message::Text(frame.clone()));
        }
    }

    /// Deliver to a single connection (error replies).
    fn send_to(&self, id: &str, ev: &ServerEvent) {
        if let Some(tx) = self.senders.get(id) {
            self.send_to_sender(tx, ev);
        }
    }

    fn send_to_sender(&self, tx: &mpsc::Sender<Message>, ev: &ServerEvent) {
        match ev.encode() {
            Ok(s) => {
                let _ = tx.try_send(Message::Text(s));
            }
            Err(err) => tracing::error!(%err, "reply encode failed"),
        }
    }
}
