use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::{DEFAULT_CIRCLE_SEGMENTS, DEFAULT_MIN_OBSERVATIONS};

/// Pipeline-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum number of observations required before an access point is triangulated
    pub min_observations: usize,
    /// Overlay document settings
    pub overlay: OverlayConfig,
}

/// Overlay document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Number of segments approximating each uncertainty circle
    pub circle_segments: usize,
    /// Document title
    pub document_name: String,
    /// Icon used for access point markers
    pub point_icon_href: String,
    /// Circle outline colour (KML aabbggrr)
    pub circle_line_color: String,
    /// Circle outline width (pixels)
    pub circle_line_width: u32,
    /// Circle fill colour (KML aabbggrr)
    pub circle_fill_color: String,
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON deserialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
            document_name: "Triangulated WiFi Access Points".to_string(),
            point_icon_href: "http://maps.google.com/mapfiles/kml/shapes/wifi.png".to_string(),
            circle_line_color: "7f0000ff".to_string(), // semi-transparent red
            circle_line_width: 2,
            circle_fill_color: "3f0000ff".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: PipelineConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Override the observation threshold
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Override the circle segment count
    pub fn with_circle_segments(mut self, segments: usize) -> Self {
        self.overlay.circle_segments = segments;
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_observations < 1 {
            return Err(ConfigError::InvalidParameter {
                parameter: "min_observations".to_string(),
                value: self.min_observations.to_string(),
                reason: "At least one observation is required per access point".to_string(),
            });
        }

        if self.overlay.circle_segments < 3 {
            return Err(ConfigError::InvalidParameter {
                parameter: "overlay.circle_segments".to_string(),
                value: self.overlay.circle_segments.to_string(),
                reason: "A circle needs at least 3 segments".to_string(),
            });
        }

        if self.overlay.circle_line_width == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "overlay.circle_line_width".to_string(),
                value: "0".to_string(),
                reason: "Line width must be positive".to_string(),
            });
        }

        for (parameter, color) in [
            ("overlay.circle_line_color", &self.overlay.circle_line_color),
            ("overlay.circle_fill_color", &self.overlay.circle_fill_color),
        ] {
            if color.len() != 8 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: color.clone(),
                    reason: "Colour must be 8 hex digits (aabbggrr)".to_string(),
                });
            }
        }

        Ok(())
    }
}
