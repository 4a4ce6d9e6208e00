//! Presence registry: connection id -> last-known state.
//!
//! Pure data structure, no I/O and no locking. A record exists iff its
//! connection is live; the hub is the only writer. Stored coordinates are
//! always in range because `set_location` validates before touching state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use livetrack_core::error::{LivetrackError, Result};
use livetrack_core::geo::{LocationFix, LocationReport};

/// One live connection's presence state.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: String,
    pub name: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_location: Option<LocationFix>,
    pub last_update: Option<DateTime<Utc>>,
}

/// External-facing projection of a record (`GET /users`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub has_location: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    records: HashMap<String, ConnectionRecord>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Create a record for a freshly accepted connection.
    ///
    /// Ids are uuids assigned by the transport, so a collision means a
    /// server bug; it is refused rather than clobbering the live record.
    pub fn register(&mut self, id: &str, joined_at: DateTime<Utc>) -> Result<&ConnectionRecord> {
        if self.records.contains_key(id) {
            return Err(LivetrackError::Internal(format!(
                "connection id already registered: {id}"
            )));
        }
        let record = ConnectionRecord {
            id: id.to_string(),
            name: None,
            joined_at,
            last_location: None,
            last_update: None,
        };
        Ok(self.records.entry(id.to_string()).or_insert(record))
    }

    pub fn get(&self, id: &str) -> Option<&ConnectionRecord> {
        self.records.get(id)
    }

    /// Delete a record; no-op when the id is not live.
    pub fn remove(&mut self, id: &str) -> Option<ConnectionRecord> {
        self.records.remove(id)
    }

    /// Overwrite the display name (last write wins, no uniqueness).
    ///
    /// Silently a no-op when the record is absent or the trimmed name is
    /// empty. Returns the stored name so the caller knows whether to
    /// broadcast.
    pub fn set_name(&mut self, id: &str, name: &str) -> Option<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        let record = self.records.get_mut(id)?;
        record.name = Some(trimmed.to_string());
        record.name.clone()
    }

    /// Validate and store a position report, refreshing `last_update`.
    ///
    /// On `InvalidLocation` the prior state is untouched. `last_update`
    /// takes the report's timestamp when present, otherwise `now`.
    pub fn set_location(
        &mut self,
        id: &str,
        report: LocationReport,
        now: DateTime<Utc>,
    ) -> Result<LocationFix> {
        let fix = report.into_fix(now)?;
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| LivetrackError::Processing(format!("no record for connection {id}")))?;
        record.last_location = Some(fix.clone());
        record.last_update = Some(fix.timestamp);
        Ok(fix)
    }

    /// Number of live records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Summaries for every live record, no ordering guarantee.
    pub fn summaries(&self) -> Vec<UserSummary> {
        self.records
            .values()
            .map(|r| UserSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                has_location: r.last_location.is_some(),
                last_update: r.last_update,
                joined_at: r.joined_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn report(lat: f64, lon: f64) -> LocationReport {
        LocationReport {
            latitude: lat,
            longitude: lon,
            accuracy: None,
            timestamp: None,
        }
    }

    #[test]
    fn register_then_remove_is_absent() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();
        assert_eq!(reg.count(), 1);

        reg.remove("u1");
        assert!(reg.get("u1").is_none());
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn duplicate_register_refused() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();
        assert!(reg.register("u1", Utc::now()).is_err());
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut reg = PresenceRegistry::new();
        assert!(reg.remove("ghost").is_none());
    }

    #[test]
    fn valid_location_is_stored_exactly() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();

        let now = Utc::now();
        let fix = reg.set_location("u1", report(40.7128, -74.0060), now).unwrap();
        assert_eq!(fix.latitude, 40.7128);
        assert_eq!(fix.longitude, -74.0060);

        let stored = reg.get("u1").unwrap().last_location.as_ref().unwrap();
        assert_eq!(stored, &fix);
        assert_eq!(reg.get("u1").unwrap().last_update, Some(now));
    }

    #[test]
    fn boundary_coordinates_accepted() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0)] {
            reg.set_location("u1", report(lat, lon), Utc::now()).unwrap();
        }
    }

    #[test]
    fn invalid_location_leaves_prior_state() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();

        // Never located: stays absent.
        let err = reg.set_location("u1", report(999.0, 0.0), Utc::now()).unwrap_err();
        assert_eq!(err.client_code().as_str(), "INVALID_LOCATION");
        assert!(reg.get("u1").unwrap().last_location.is_none());
        assert_eq!(reg.count(), 1);

        // Previously located: prior fix survives.
        let good = reg.set_location("u1", report(10.0, 20.0), Utc::now()).unwrap();
        assert!(reg.set_location("u1", report(0.0, -200.0), Utc::now()).is_err());
        assert_eq!(reg.get("u1").unwrap().last_location.as_ref(), Some(&good));
    }

    #[test]
    fn last_update_prefers_client_timestamp() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();

        let now = Utc::now();
        let then = now - chrono::Duration::minutes(5);
        let rep = LocationReport {
            latitude: 1.0,
            longitude: 2.0,
            accuracy: Some(3.0),
            timestamp: Some(then),
        };
        reg.set_location("u1", rep, now).unwrap();
        assert_eq!(reg.get("u1").unwrap().last_update, Some(then));
    }

    #[test]
    fn set_name_trims_and_ignores_empty() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();

        assert_eq!(reg.set_name("u1", "  Alice  "), Some("Alice".to_string()));
        assert_eq!(reg.get("u1").unwrap().name.as_deref(), Some("Alice"));

        assert!(reg.set_name("u1", "   ").is_none());
        assert_eq!(reg.get("u1").unwrap().name.as_deref(), Some("Alice"));

        assert!(reg.set_name("ghost", "Bob").is_none());
    }

    #[test]
    fn set_name_idempotent_and_last_write_wins() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();

        reg.set_name("u1", "Alice");
        reg.set_name("u1", "Alice");
        assert_eq!(reg.get("u1").unwrap().name.as_deref(), Some("Alice"));

        reg.set_name("u1", "Bob");
        assert_eq!(reg.get("u1").unwrap().name.as_deref(), Some("Bob"));
    }

    #[test]
    fn summaries_reflect_location_presence() {
        let mut reg = PresenceRegistry::new();
        reg.register("u1", Utc::now()).unwrap();
        reg.register("u2", Utc::now()).unwrap();
        reg.set_location("u1", report(40.7128, -74.0060), Utc::now()).unwrap();

        let summaries = reg.summaries();
        assert_eq!(summaries.len(), 2);
        let u1 = summaries.iter().find(|s| s.id == "u1").unwrap();
        assert!(u1.has_location);
        let u2 = summaries.iter().find(|s| s.id == "u2").unwrap();
        assert!(!u2.has_location);

        reg.remove("u1");
        reg.remove("u2");
        assert_eq!(reg.count(), 0);
        assert!(reg.summaries().is_empty());
    }
}
