//! Error taxonomy for the triangulation pipeline
//!
//! Data-quality problems in individual records never surface here; they are
//! recovered per record and counted (see `processing::parser::SkipReason`).
//! The variants below are the failures a caller has to deal with.

use thiserror::Error;

use crate::processing::source::SourceError;
use crate::utils::config::ConfigError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, TriangulationError>;

/// Fatal pipeline failures
#[derive(Debug, Error)]
pub enum TriangulationError {
    /// Rejected configuration (e.g. a zero observation threshold)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The estimator was handed no observations to work with
    #[error("cannot estimate a position from an empty observation list")]
    EmptyObservations,

    /// An observation's weight is not a finite number
    #[error("observation weight is not finite (signal {signal_strength} dBm, accuracy {accuracy} m)")]
    NonFiniteWeight { signal_strength: i32, accuracy: f64 },

    /// The record source could not be opened or its header read
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The overlay document could not be encoded
    #[error("failed to encode overlay document: {0}")]
    Markup(#[from] quick_xml::Error),

    /// Writing the output artifact failed
    #[error("failed to write '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TriangulationError {
    /// Whether this failure stems from caller misuse rather than the input data
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TriangulationError::Config(_)
                | TriangulationError::EmptyObservations
                | TriangulationError::NonFiniteWeight { .. }
        )
    }
}
