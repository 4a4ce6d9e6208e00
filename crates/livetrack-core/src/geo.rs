//! Geolocation types and coordinate validation.
//!
//! Bounds are WGS84 degrees: latitude in [-90, 90], longitude in
//! [-180, 180]. Anything outside (or non-finite) is rejected before it can
//! reach the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LivetrackError, Result};

pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;

/// Check a coordinate pair against the WGS84 bounds.
pub fn validate_coords(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(LivetrackError::InvalidLocation(format!(
            "non-finite coordinates: lat={latitude}, lon={longitude}"
        )));
    }
    if !(LAT_MIN..=LAT_MAX).contains(&latitude) {
        return Err(LivetrackError::InvalidLocation(format!(
            "latitude {latitude} out of [-90, 90]"
        )));
    }
    if !(LON_MIN..=LON_MAX).contains(&longitude) {
        return Err(LivetrackError::InvalidLocation(format!(
            "longitude {longitude} out of [-180, 180]"
        )));
    }
    Ok(())
}

/// A validated, fully-populated position sample as stored and rebroadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius in meters, when the client provides one.
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Raw position payload as sent by a client (`send-location`).
///
/// `latitude`/`longitude` are required at the serde level; `accuracy` and
/// `timestamp` are optional and defaulted when the report is turned into a
/// [`LocationFix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LocationReport {
    /// Validate and convert into a stored fix, filling the timestamp with
    /// `now` when the client did not supply one.
    pub fn into_fix(self, now: DateTime<Utc>) -> Result<LocationFix> {
        validate_coords(self.latitude, self.longitude)?;
        Ok(LocationFix {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}
