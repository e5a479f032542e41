//! Overlay document model and builder
//!
//! The builder turns located access points into a tree of folders and
//! placemarks. It is format-neutral; see [`crate::api::kml`] for encoding.

use crate::algorithms::geodesy::{circle_polygon, CirclePolygon};
use crate::core::{GeoPoint, LocatedAccessPoint};
use crate::utils::config::OverlayConfig;

pub const POINT_STYLE_ID: &str = "apPoint";
pub const CIRCLE_STYLE_ID: &str = "accuracyCircle";

/// Shared style referenced by placemarks
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    /// Marker icon
    Icon { id: String, href: String },
    /// Outlined, filled area
    Area {
        id: String,
        line_color: String,
        line_width: u32,
        fill_color: String,
    },
}

impl Style {
    pub fn id(&self) -> &str {
        match self {
            Style::Icon { id, .. } | Style::Area { id, .. } => id,
        }
    }
}

/// Key/value attribute attached to a placemark
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
    pub name: String,
    pub value: String,
}

impl DataEntry {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    /// Ground-clamped closed ring
    Polygon(CirclePolygon),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub style_url: String,
    pub metadata: Vec<DataEntry>,
    pub geometry: Geometry,
}

/// One access point's features, grouped
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    pub placemarks: Vec<Placemark>,
}

/// Root of the overlay tree
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDocument {
    pub name: String,
    pub description: String,
    pub styles: Vec<Style>,
    pub folders: Vec<Folder>,
}

/// Builds overlay documents from located access points
#[derive(Debug, Clone)]
pub struct OverlayBuilder {
    config: OverlayConfig,
}

impl Default for OverlayBuilder {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl OverlayBuilder {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, access_points: &[LocatedAccessPoint]) -> OverlayDocument {
        OverlayDocument {
            name: self.config.document_name.clone(),
            description: format!(
                "Triangulated positions of {} access points from Wigle wardriving data",
                access_points.len()
            ),
            styles: self.styles(),
            folders: access_points.iter().map(|ap| self.folder(ap)).collect(),
        }
    }

    fn styles(&self) -> Vec<Style> {
        vec![
            Style::Icon {
                id: POINT_STYLE_ID.to_string(),
                href: self.config.point_icon_href.clone(),
            },
            Style::Area {
                id: CIRCLE_STYLE_ID.to_string(),
                line_color: self.config.circle_line_color.clone(),
                line_width: self.config.circle_line_width,
                fill_color: self.config.circle_fill_color.clone(),
            },
        ]
    }

    /// Point marker and uncertainty circle for one access point
    pub fn folder(&self, ap: &LocatedAccessPoint) -> Folder {
        let metadata = metadata(ap);

        let point = Placemark {
            name: "Point".to_string(),
            style_url: format!("#{}", POINT_STYLE_ID),
            metadata: metadata.clone(),
            geometry: Geometry::Point(ap.position()),
        };

        let circle = Placemark {
            name: "Circle".to_string(),
            style_url: format!("#{}", CIRCLE_STYLE_ID),
            metadata,
            geometry: Geometry::Polygon(circle_polygon(
                ap.position(),
                ap.uncertainty_radius_m,
                self.config.circle_segments,
            )),
        };

        Folder {
            name: ap.label().to_string(),
            placemarks: vec![point, circle],
        }
    }
}

fn metadata(ap: &LocatedAccessPoint) -> Vec<DataEntry> {
    vec![
        DataEntry::new("MAC", ap.identity.as_str()),
        DataEntry::new("SSID", ap.ssid_or_hidden()),
        DataEntry::new("Observations", ap.observation_count.to_string()),
        DataEntry::new("Uncertainty_m", format!("{:.1}", ap.uncertainty_radius_m)),
    ]
}
