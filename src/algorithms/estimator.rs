//! Weighted-centroid position estimation for a single access point
//!
//! Each observation is weighted by its linear received power
//! (`10^(dBm/10)`) scaled by `1 / (accuracy + 1)`. The centroid is a plain
//! weighted mean of latitude and longitude, which is fine over the few hundred
//! metres one access point is heard across. The uncertainty radius is the
//! weighted mean distance from the centroid plus the mean GPS accuracy; it is a
//! heuristic bound, not a calibrated confidence interval.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::geodesy;
use crate::core::{GeoPoint, Observation};
use crate::validation::{Result, TriangulationError};

/// Output of the estimator for one access point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub latitude: f64,
    pub longitude: f64,
    pub uncertainty_radius_m: f64,
}

impl PositionEstimate {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Linear received power for a dBm reading; infinite above roughly 3082 dBm
pub fn signal_power(signal_strength: i32) -> f64 {
    10f64.powf(signal_strength as f64 / 10.0)
}

/// Raw, un-normalized weight of a single observation
pub fn observation_weight(obs: &Observation) -> f64 {
    let signal_weight = signal_power(obs.signal_strength);
    // +1 keeps a zero accuracy finite
    let accuracy_weight = 1.0 / (obs.accuracy + 1.0);
    signal_weight * accuracy_weight
}

/// Weights normalized to sum to one.
///
/// When every raw weight underflows to zero the observations are weighted
/// equally, so each one still contributes and nothing divides by zero.
/// Raw weights must be finite; they are scaled by the largest one before
/// summing so that several huge weights cannot overflow the total.
pub fn normalized_weights(observations: &[Observation]) -> DVector<f64> {
    let n = observations.len();
    let weights = DVector::from_iterator(n, observations.iter().map(observation_weight));
    let peak = weights.iter().copied().fold(0.0, f64::max);

    if peak == 0.0 {
        return DVector::from_element(n, 1.0 / n as f64);
    }

    let scaled = weights / peak;
    let total = scaled.sum();
    scaled / total
}

/// Estimate position and uncertainty from one access point's observations
pub fn estimate_position(observations: &[Observation]) -> Result<PositionEstimate> {
    if observations.is_empty() {
        return Err(TriangulationError::EmptyObservations);
    }

    if let Some(obs) = observations
        .iter()
        .find(|obs| !observation_weight(obs).is_finite())
    {
        return Err(TriangulationError::NonFiniteWeight {
            signal_strength: obs.signal_strength,
            accuracy: obs.accuracy,
        });
    }

    let n = observations.len();
    let weights = normalized_weights(observations);

    let latitudes = DVector::from_iterator(n, observations.iter().map(|o| o.latitude));
    let longitudes = DVector::from_iterator(n, observations.iter().map(|o| o.longitude));
    let accuracies = DVector::from_iterator(n, observations.iter().map(|o| o.accuracy));

    let centroid = GeoPoint::new(weights.dot(&latitudes), weights.dot(&longitudes));

    let distances = DVector::from_iterator(
        n,
        observations
            .iter()
            .map(|o| geodesy::distance(centroid, o.position())),
    );

    let spread_m = weights.dot(&distances);
    let mean_accuracy_m = accuracies.mean();

    debug!(
        observations = n,
        spread_m,
        mean_accuracy_m,
        "Estimated weighted centroid"
    );

    Ok(PositionEstimate {
        latitude: centroid.lat,
        longitude: centroid.lon,
        uncertainty_radius_m: spread_m + mean_accuracy_m,
    })
}
