//! Client-to-server events.

use serde::{Deserialize, Serialize};

use crate::error::{LivetrackError, Result};
use crate::geo::LocationReport;

/// Events a client may send over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Periodic position report.
    SendLocation(LocationReport),
    /// Optional display-name announcement. Does not gate location sharing.
    IdentifyUser { name: String },
}

impl ClientEvent {
    /// Decode one inbound text frame.
    ///
    /// Unknown event names and missing required fields surface as
    /// `BadRequest`; the caller reports that to the offending sender only.
    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame)
            .map_err(|e| LivetrackError::BadRequest(format!("decode failed: {e}")))
    }
}
