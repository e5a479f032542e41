//! Spherical-earth geodesy helpers
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_M`]. Offsets use an equirectangular small-angle
//! approximation: good for tens to low hundreds of metres at moderate
//! latitudes, increasingly wrong toward the poles where `cos(lat)` collapses.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::{GeoPoint, EARTH_RADIUS_M};

/// Great-circle distance between two points (m)
pub fn distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let delta_phi = (p2.lat - p1.lat).to_radians();
    let delta_lambda = (p2.lon - p1.lon).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Point `radius_m` away from `center` along `bearing_rad`.
///
/// Bearing 0 points north and increases clockwise (π/2 is east).
pub fn offset_point(center: GeoPoint, bearing_rad: f64, radius_m: f64) -> GeoPoint {
    let d_lat = (radius_m * bearing_rad.cos()) / EARTH_RADIUS_M;
    let d_lon = (radius_m * bearing_rad.sin()) / (EARTH_RADIUS_M * center.lat.to_radians().cos());

    GeoPoint::new(center.lat + d_lat.to_degrees(), center.lon + d_lon.to_degrees())
}

/// Closed ring of points approximating a circle on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirclePolygon {
    pub points: Vec<GeoPoint>,
}

impl CirclePolygon {
    /// First and last points coincide
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sample `segments` equally spaced bearings around `center` and close the ring.
///
/// The result always holds `segments + 1` points; the last is a copy of the first.
pub fn circle_polygon(center: GeoPoint, radius_m: f64, segments: usize) -> CirclePolygon {
    let mut points: Vec<GeoPoint> = (0..segments)
        .map(|i| {
            let bearing = 2.0 * PI * i as f64 / segments as f64;
            offset_point(center, bearing, radius_m)
        })
        .collect();

    if let Some(&first) = points.first() {
        points.push(first);
    }

    CirclePolygon { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_zero_for_identical_points() {
        let p = GeoPoint::new(40.7128, -74.0060);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = GeoPoint::new(40.0, -74.0);
        let b = GeoPoint::new(40.0001, -74.0002);
        assert_relative_eq!(distance(a, b), distance(b, a), epsilon = 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // π R / 180 on the mean sphere
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert_relative_eq!(d, 111_194.93, epsilon = 0.01);
    }

    #[test]
    fn test_known_city_pair() {
        // New York to London, roughly 5570 km on the mean sphere
        let nyc = GeoPoint::new(40.7128, -74.0060);
        let london = GeoPoint::new(51.5074, -0.1278);
        let d = distance(nyc, london);
        assert!((d - 5_570_000.0).abs() < 10_000.0, "got {}", d);
    }

    #[test]
    fn test_offset_point_north_and_east() {
        let center = GeoPoint::new(40.0, -74.0);

        let north = offset_point(center, 0.0, 100.0);
        assert_relative_eq!(north.lon, center.lon, epsilon = 1e-12);
        assert!(north.lat > center.lat);
        assert_relative_eq!(distance(center, north), 100.0, epsilon = 0.01);

        let east = offset_point(center, PI / 2.0, 100.0);
        assert!(east.lon > center.lon);
        assert_relative_eq!(distance(center, east), 100.0, epsilon = 0.05);
    }

    #[test]
    fn test_offset_zero_radius() {
        let center = GeoPoint::new(12.5, 45.25);
        let p = offset_point(center, 1.234, 0.0);
        assert_eq!(p, center);
    }

    #[test]
    fn test_circle_is_closed_with_expected_length() {
        let circle = circle_polygon(GeoPoint::new(40.0, -74.0), 25.0, 64);
        assert_eq!(circle.len(), 65);
        assert!(circle.is_closed());
        assert_eq!(circle.points.first(), circle.points.last());
    }

    #[test]
    fn test_circle_points_on_radius() {
        let center = GeoPoint::new(40.0, -74.0);
        let circle = circle_polygon(center, 50.0, 64);
        for p in &circle.points {
            assert_relative_eq!(distance(center, *p), 50.0, epsilon = 0.1);
        }
    }

    #[test]
    fn test_circle_without_segments_is_empty() {
        let circle = circle_polygon(GeoPoint::new(0.0, 0.0), 10.0, 0);
        assert!(circle.is_empty());
        assert!(!circle.is_closed());
    }
}
