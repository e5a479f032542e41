use std::collections::HashMap;
use std::fmt;

use crate::algorithms::estimator::signal_power;
use crate::core::{AccessPointIdentity, Observation, DEFAULT_ACCURACY_M, DEFAULT_SIGNAL_DBM};

/// One raw record as exposed by the record source: column name to value
pub type RawRecord = HashMap<String, String>;

/// Recognized column aliases, in priority order
pub const MAC_FIELDS: &[&str] = &["MAC"];
pub const SSID_FIELDS: &[&str] = &["SSID"];
pub const LATITUDE_FIELDS: &[&str] = &["CurrentLatitude", "Lat"];
pub const LONGITUDE_FIELDS: &[&str] = &["CurrentLongitude", "Lon"];
pub const SIGNAL_FIELDS: &[&str] = &["RSSI", "Signal"];
pub const ACCURACY_FIELDS: &[&str] = &["Accuracy", "AccuracyMeters"];

/// A record that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub identity: AccessPointIdentity,
    pub display_name: Option<String>,
    pub observation: Observation,
}

/// Why a record was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No hardware address, or an empty one
    MissingIdentity,
    /// Latitude or longitude column absent or empty
    MissingCoordinate { field: &'static str },
    /// A numeric column held something that is not a usable number
    MalformedNumber { field: &'static str, value: String },
    /// Coordinates were exactly (0, 0): the device had no GPS fix
    NoFix,
    /// The record source could not decode the row
    Unreadable { details: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingIdentity => write!(f, "missing MAC address"),
            SkipReason::MissingCoordinate { field } => write!(f, "missing {}", field),
            SkipReason::MalformedNumber { field, value } => {
                write!(f, "malformed {} value '{}'", field, value)
            }
            SkipReason::NoFix => write!(f, "no GPS fix (0, 0)"),
            SkipReason::Unreadable { details } => write!(f, "unreadable row: {}", details),
        }
    }
}

/// Outcome of validating a single record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Accepted(ParsedRecord),
    Skipped(SkipReason),
}

/// Look up the first alias present in the record; blank values count as absent
fn field<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|name| record.get(*name))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_coordinate(
    record: &RawRecord,
    aliases: &[&str],
    field_name: &'static str,
) -> Result<f64, SkipReason> {
    let raw = field(record, aliases).ok_or(SkipReason::MissingCoordinate { field: field_name })?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| SkipReason::MalformedNumber {
            field: field_name,
            value: raw.to_string(),
        })
}

fn parse_accuracy(record: &RawRecord) -> Result<f64, SkipReason> {
    match field(record, ACCURACY_FIELDS) {
        None => Ok(DEFAULT_ACCURACY_M),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| SkipReason::MalformedNumber {
                field: "accuracy",
                value: raw.to_string(),
            }),
    }
}

/// Absent or non-integer signal becomes the default. An integer whose linear
/// power overflows is rejected.
fn parse_signal(record: &RawRecord) -> Result<i32, SkipReason> {
    let Some(raw) = field(record, SIGNAL_FIELDS) else {
        return Ok(DEFAULT_SIGNAL_DBM);
    };
    let Ok(dbm) = raw.parse::<i32>() else {
        return Ok(DEFAULT_SIGNAL_DBM);
    };

    if signal_power(dbm).is_finite() {
        Ok(dbm)
    } else {
        Err(SkipReason::MalformedNumber {
            field: "signal",
            value: raw.to_string(),
        })
    }
}

/// Validate one raw record into an observation, or say why it was skipped
pub fn parse_record(record: &RawRecord) -> RecordOutcome {
    match try_parse_record(record) {
        Ok(parsed) => RecordOutcome::Accepted(parsed),
        Err(reason) => RecordOutcome::Skipped(reason),
    }
}

fn try_parse_record(record: &RawRecord) -> Result<ParsedRecord, SkipReason> {
    let identity = field(record, MAC_FIELDS)
        .and_then(AccessPointIdentity::parse)
        .ok_or(SkipReason::MissingIdentity)?;

    let display_name = field(record, SSID_FIELDS).map(str::to_string);

    let latitude = parse_coordinate(record, LATITUDE_FIELDS, "latitude")?;
    let longitude = parse_coordinate(record, LONGITUDE_FIELDS, "longitude")?;
    let signal_strength = parse_signal(record)?;
    let accuracy = parse_accuracy(record)?;

    if latitude == 0.0 && longitude == 0.0 {
        return Err(SkipReason::NoFix);
    }

    Ok(ParsedRecord {
        identity,
        display_name,
        observation: Observation::new(latitude, longitude, signal_strength, accuracy),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn accepted(outcome: RecordOutcome) -> ParsedRecord {
        match outcome {
            RecordOutcome::Accepted(parsed) => parsed,
            RecordOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    fn skipped(outcome: RecordOutcome) -> SkipReason {
        match outcome {
            RecordOutcome::Skipped(reason) => reason,
            RecordOutcome::Accepted(parsed) => panic!("unexpected accept: {:?}", parsed),
        }
    }

    #[test]
    fn test_parse_full_wigle_row() {
        let raw = record(&[
            ("MAC", " aa:bb:cc:dd:ee:ff "),
            ("SSID", " HomeNet "),
            ("CurrentLatitude", "40.0"),
            ("CurrentLongitude", "-74.0"),
            ("RSSI", "-50"),
            ("AccuracyMeters", "5"),
        ]);
        let parsed = accepted(parse_record(&raw));

        assert_eq!(parsed.identity.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(parsed.display_name.as_deref(), Some("HomeNet"));
        assert_eq!(parsed.observation, Observation::new(40.0, -74.0, -50, 5.0));
    }

    #[test]
    fn test_short_aliases() {
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("Lat", "12.5"),
            ("Lon", "13.5"),
            ("Signal", "-70"),
            ("Accuracy", "3.5"),
        ]);
        let parsed = accepted(parse_record(&raw));
        assert_eq!(parsed.observation, Observation::new(12.5, 13.5, -70, 3.5));
        assert_eq!(parsed.display_name, None);
    }

    #[test]
    fn test_primary_alias_wins() {
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("CurrentLatitude", "1.0"),
            ("Lat", "9.0"),
            ("CurrentLongitude", "2.0"),
            ("Lon", "9.0"),
        ]);
        let parsed = accepted(parse_record(&raw));
        assert_eq!(parsed.observation.latitude, 1.0);
        assert_eq!(parsed.observation.longitude, 2.0);
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "1"), ("Lon", "2")]);
        let parsed = accepted(parse_record(&raw));
        assert_eq!(parsed.observation.signal_strength, -100);
        assert_eq!(parsed.observation.accuracy, 10.0);
    }

    #[test]
    fn test_unparseable_signal_defaults() {
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("Lat", "1"),
            ("Lon", "2"),
            ("RSSI", "strong"),
        ]);
        let parsed = accepted(parse_record(&raw));
        assert_eq!(parsed.observation.signal_strength, -100);
    }

    #[test]
    fn test_overflowing_signal_is_malformed() {
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("Lat", "1"),
            ("Lon", "2"),
            ("RSSI", "4000"),
        ]);
        assert_eq!(
            skipped(parse_record(&raw)),
            SkipReason::MalformedNumber {
                field: "signal",
                value: "4000".to_string()
            }
        );

        // Very weak readings underflow to zero power and are kept
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("Lat", "1"),
            ("Lon", "2"),
            ("RSSI", "-4000"),
        ]);
        assert_eq!(accepted(parse_record(&raw)).observation.signal_strength, -4000);
    }

    #[test]
    fn test_missing_identity() {
        let raw = record(&[("MAC", "   "), ("Lat", "1"), ("Lon", "2")]);
        assert_eq!(skipped(parse_record(&raw)), SkipReason::MissingIdentity);

        let raw = record(&[("Lat", "1"), ("Lon", "2")]);
        assert_eq!(skipped(parse_record(&raw)), SkipReason::MissingIdentity);
    }

    #[test]
    fn test_zero_zero_is_no_fix() {
        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "0"), ("Lon", "0.0")]);
        assert_eq!(skipped(parse_record(&raw)), SkipReason::NoFix);
    }

    #[test]
    fn test_single_zero_coordinate_is_kept() {
        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "0"), ("Lon", "31.2")]);
        let parsed = accepted(parse_record(&raw));
        assert_eq!(parsed.observation.latitude, 0.0);
    }

    #[test]
    fn test_malformed_coordinates() {
        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "north"), ("Lon", "2")]);
        assert_eq!(
            skipped(parse_record(&raw)),
            SkipReason::MalformedNumber {
                field: "latitude",
                value: "north".to_string()
            }
        );

        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "1"), ("Lon", "NaN")]);
        assert!(matches!(
            skipped(parse_record(&raw)),
            SkipReason::MalformedNumber { field: "longitude", .. }
        ));
    }

    #[test]
    fn test_missing_coordinate() {
        let raw = record(&[("MAC", "00:11:22:33:44:55"), ("Lat", "1"), ("Lon", "")]);
        assert_eq!(
            skipped(parse_record(&raw)),
            SkipReason::MissingCoordinate { field: "longitude" }
        );
    }

    #[test]
    fn test_malformed_accuracy() {
        let raw = record(&[
            ("MAC", "00:11:22:33:44:55"),
            ("Lat", "1"),
            ("Lon", "2"),
            ("Accuracy", "-3"),
        ]);
        assert!(matches!(
            skipped(parse_record(&raw)),
            SkipReason::MalformedNumber { field: "accuracy", .. }
        ));
    }
}
