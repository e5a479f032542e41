//! Output side: overlay document construction and KML encoding

pub mod overlay;
pub mod kml;

pub use overlay::{DataEntry, Folder, Geometry, OverlayBuilder, OverlayDocument, Placemark, Style};
pub use kml::KmlWriter;
