//! Server-to-client events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LivetrackError, Result};
use crate::geo::LocationFix;

/// Events the server broadcasts (or, for `Error`, sends to one peer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Live connection count, sent to everyone on connect and disconnect.
    UserCountUpdated { count: usize },
    /// Accepted position rebroadcast. `accuracy` is `null` when the client
    /// did not report one.
    ReceivedLocation {
        id: String,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        timestamp: DateTime<Utc>,
    },
    /// A peer announced (or re-announced) its display name.
    UserIdentified { id: String, name: String },
    /// A peer left; the data is the bare connection id.
    UserDisconnected(String),
    /// Per-event rejection, delivered to the offending sender only.
    Error { message: String },
}

impl ServerEvent {
    /// Build a `received-location` broadcast from an accepted fix.
    pub fn received(id: &str, fix: &LocationFix) -> Self {
        ServerEvent::ReceivedLocation {
            id: id.to_string(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            timestamp: fix.timestamp,
        }
    }

    /// Build the `error` event shown to a sender for a rejected event.
    pub fn error_for(err: &LivetrackError) -> Self {
        ServerEvent::Error {
            message: err.client_message().to_string(),
        }
    }

    /// Serialize once for fan-out (the same string goes to every peer).
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| LivetrackError::Internal(format!("json encode failed: {e}")))
    }
}
