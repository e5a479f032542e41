//! Wigle Wardriving Triangulation
//!
//! Estimates Wi-Fi access point positions from Wigle wardriving exports using
//! a signal- and accuracy-weighted centroid, and renders the results as a KML
//! overlay with uncertainty circles.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

use std::path::Path;

// Re-export commonly used types
pub use crate::core::{AccessPointIdentity, GeoPoint, LocatedAccessPoint, Observation};
pub use crate::algorithms::{
    circle_polygon, distance, estimate_position, offset_point, CirclePolygon, PositionEstimate,
};
pub use crate::processing::{
    PipelineOutcome, RawRecord, RunSummary, SkipReason, SkipTally, SourceError,
    TriangulationPipeline, WigleCsvSource,
};
pub use crate::api::{KmlWriter, OverlayBuilder, OverlayDocument};
pub use crate::utils::{ConfigError, OverlayConfig, PipelineConfig};
pub use crate::validation::{Result, TriangulationError};

/// Read a Wigle export and triangulate every qualifying access point
pub fn triangulate_file<P: AsRef<Path>>(path: P, config: PipelineConfig) -> Result<PipelineOutcome> {
    let pipeline = TriangulationPipeline::new(config)?;
    let records = WigleCsvSource::open(path)?.into_records()?;
    pipeline.run(records)
}
