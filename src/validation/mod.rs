//! Error reporting for the pipeline

pub mod error;

pub use error::{Result, TriangulationError};
