//! Positioning algorithms

pub mod geodesy;
pub mod estimator;

pub use geodesy::{circle_polygon, distance, offset_point, CirclePolygon};
pub use estimator::{estimate_position, PositionEstimate};
