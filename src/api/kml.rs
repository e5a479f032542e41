//! KML 2.2 encoding of overlay documents

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

use crate::api::overlay::{DataEntry, Folder, Geometry, OverlayDocument, Placemark, Style};
use crate::core::GeoPoint;
use crate::validation::{Result, TriangulationError};

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

type XmlResult = std::result::Result<(), quick_xml::Error>;

/// Serializes an [`OverlayDocument`] as indented KML
#[derive(Debug, Clone, Copy)]
pub struct KmlWriter {
    indent: usize,
}

impl Default for KmlWriter {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl KmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    pub fn to_bytes(&self, document: &OverlayDocument) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.indent);
        write_document(&mut writer, document)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn to_kml_string(&self, document: &OverlayDocument) -> Result<String> {
        let bytes = self.to_bytes(document)?;
        // Writer input is all &str, so the output is valid UTF-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, document: &OverlayDocument, path: P) -> Result<()> {
        let bytes = self.to_bytes(document)?;
        fs::write(&path, bytes).map_err(|source| TriangulationError::Output {
            path: path.as_ref().display().to_string(),
            source,
        })
    }
}

fn coordinate(point: &GeoPoint) -> String {
    format!("{},{},0", point.lon, point.lat)
}

fn start<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new(name)))
}

fn end<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> XmlResult {
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> XmlResult {
    start(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn write_document<W: std::io::Write>(writer: &mut Writer<W>, document: &OverlayDocument) -> XmlResult {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    start(writer, "Document")?;

    text_element(writer, "name", &document.name)?;
    text_element(writer, "description", &document.description)?;

    for style in &document.styles {
        write_style(writer, style)?;
    }
    for folder in &document.folders {
        write_folder(writer, folder)?;
    }

    end(writer, "Document")?;
    end(writer, "kml")
}

fn write_style<W: std::io::Write>(writer: &mut Writer<W>, style: &Style) -> XmlResult {
    writer.write_event(Event::Start(
        BytesStart::new("Style").with_attributes([("id", style.id())]),
    ))?;

    match style {
        Style::Icon { href, .. } => {
            start(writer, "IconStyle")?;
            start(writer, "Icon")?;
            text_element(writer, "href", href)?;
            end(writer, "Icon")?;
            end(writer, "IconStyle")?;
        }
        Style::Area {
            line_color,
            line_width,
            fill_color,
            ..
        } => {
            start(writer, "LineStyle")?;
            text_element(writer, "color", line_color)?;
            text_element(writer, "width", &line_width.to_string())?;
            end(writer, "LineStyle")?;
            start(writer, "PolyStyle")?;
            text_element(writer, "color", fill_color)?;
            end(writer, "PolyStyle")?;
        }
    }

    end(writer, "Style")
}

fn write_folder<W: std::io::Write>(writer: &mut Writer<W>, folder: &Folder) -> XmlResult {
    start(writer, "Folder")?;
    text_element(writer, "name", &folder.name)?;
    for placemark in &folder.placemarks {
        write_placemark(writer, placemark)?;
    }
    end(writer, "Folder")
}

fn write_placemark<W: std::io::Write>(writer: &mut Writer<W>, placemark: &Placemark) -> XmlResult {
    start(writer, "Placemark")?;
    text_element(writer, "name", &placemark.name)?;
    write_extended_data(writer, &placemark.metadata)?;
    text_element(writer, "styleUrl", &placemark.style_url)?;

    match &placemark.geometry {
        Geometry::Point(point) => {
            start(writer, "Point")?;
            text_element(writer, "coordinates", &coordinate(point))?;
            end(writer, "Point")?;
        }
        Geometry::Polygon(ring) => {
            start(writer, "Polygon")?;
            text_element(writer, "extrude", "0")?;
            text_element(writer, "tessellate", "1")?;
            text_element(writer, "altitudeMode", "clampToGround")?;
            start(writer, "outerBoundaryIs")?;
            start(writer, "LinearRing")?;
            let coordinates: Vec<String> = ring.points.iter().map(coordinate).collect();
            text_element(writer, "coordinates", &coordinates.join(" "))?;
            end(writer, "LinearRing")?;
            end(writer, "outerBoundaryIs")?;
            end(writer, "Polygon")?;
        }
    }

    end(writer, "Placemark")
}

fn write_extended_data<W: std::io::Write>(writer: &mut Writer<W>, entries: &[DataEntry]) -> XmlResult {
    start(writer, "ExtendedData")?;
    for entry in entries {
        writer.write_event(Event::Start(
            BytesStart::new("Data").with_attributes([("name", entry.name.as_str())]),
        ))?;
        text_element(writer, "value", &entry.value)?;
        end(writer, "Data")?;
    }
    end(writer, "ExtendedData")
}
