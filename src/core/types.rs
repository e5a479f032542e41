//! Core data types for the triangulation pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::HIDDEN_SSID;

/// WGS84 coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A single sighting of an access point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    /// Received signal strength (dBm, negative)
    pub signal_strength: i32,
    /// GPS accuracy of the fix (m)
    pub accuracy: f64,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64, signal_strength: i32, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            signal_strength,
            accuracy,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Normalized hardware address identifying one physical access point.
///
/// Construction trims and uppercases the raw address, so `aa:bb:cc:dd:ee:ff`
/// and ` AA:BB:CC:DD:EE:FF ` are the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPointIdentity(String);

impl AccessPointIdentity {
    /// Returns `None` when the address is empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessPointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Triangulated access point with estimated position and uncertainty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedAccessPoint {
    pub identity: AccessPointIdentity,
    pub display_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Heuristic uncertainty radius (m)
    pub uncertainty_radius_m: f64,
    /// Number of observations folded into the estimate
    pub observation_count: usize,
}

impl LocatedAccessPoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Display name, or the placeholder for hidden networks
    pub fn ssid_or_hidden(&self) -> &str {
        self.display_name.as_deref().unwrap_or(HIDDEN_SSID)
    }

    /// Human label: the display name when known, otherwise the MAC
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.identity.as_str())
    }
}
