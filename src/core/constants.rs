//! Physical constants and processing defaults

/// Mean Earth radius used for great-circle distances (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Signal strength assumed when a record carries none (dBm)
pub const DEFAULT_SIGNAL_DBM: i32 = -100;

/// GPS accuracy assumed when a record carries none (m)
pub const DEFAULT_ACCURACY_M: f64 = 10.0;

/// Minimum sightings before an access point is triangulated
pub const DEFAULT_MIN_OBSERVATIONS: usize = 3;

/// Segments used to approximate an uncertainty circle
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 64;

/// Display name used for access points that never broadcast an SSID
pub const HIDDEN_SSID: &str = "Hidden";
