// Copyright 2026 Viktor Reusch
//
// This file is part of kml_mission_convert.
//
// kml_mission_convert is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// kml_mission_convert is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with kml_mission_convert. If not, see <https://www.gnu.org/licenses/>.

//! Writing mission KML documents.

use std::io::Write;

use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::{Error, Point};

const KML_NS: &str = "http://www.opengis.net/kml/2.2";
const GX_NS: &str = "http://www.google.com/kml/ext/2.2";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Value for tessellating the mission line.
const TESSELLATE: &str = "1";
const STYLE_MAP_ID: &str = "m_ylw-pushpin";
const PUSHPIN_HREF: &str = "http://maps.google.com/mapfiles/kml/pushpin/ylw-pushpin.png";
/// `(id, icon scale)` of the normal and the highlighted pushpin style.
const STYLES: &[(&str, &str)] = &[("s_ylw-pushpin", "1.1"), ("s_ylw-pushpin_hl", "1.3")];
/// Attributes of the _atom:link_ naming the application the planner expects.
const APP_LINK: &[(&str, &str)] = &[
    ("rel", "app"),
    ("href", "https://www.google.com/earth/about/versions/#earth-pro"),
    ("title", "Google Earth Pro 7.3.6.10201"),
];

/// Everything needed to write one mission file.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionSpec<'a> {
    /// 1-based position of the destination in the batch.
    pub sequence_number: usize,
    /// Sanitized name, see [`crate::resolve_name`].
    pub display_name: String,
    pub base: &'a Point,
    pub destination: &'a Point,
}

impl MissionSpec<'_> {
    /// File name of the mission, e.g. `001_Info_Center.kml`.
    pub fn file_name(&self) -> String {
        format!("{:03}_{}.kml", self.sequence_number, self.display_name)
    }
}

/// Write the mission KML for `spec` to `sink`.
///
/// The document contains a single tessellated _LineString_ from the base to
/// the destination. Apart from the name and the coordinates, every document
/// is byte-identical.
///
/// # Example
/// ```
/// # use kml_mission_convert::{compose, MissionSpec, Point};
/// #
/// let base = Point::new(-117.2738922672704, 49.10373549840682, 0.0);
/// let destination = Point::new(-117.27, 49.1, 5.0);
/// let spec = MissionSpec {
///     sequence_number: 1,
///     display_name: "Info_Center".to_string(),
///     base: &base,
///     destination: &destination,
/// };
/// let mut sink = vec![];
///
/// compose(&spec, &mut sink).expect("composing failed");
///
/// let kml = String::from_utf8(sink).expect("KML data is not valid UTF-8");
/// assert!(kml.contains("<name>Info_Center.kml</name>"));
/// assert!(kml.contains("-117.2738922672704,49.10373549840682,0 -117.27,49.1,5"));
/// ```
pub fn compose(spec: &MissionSpec<'_>, sink: impl Write) -> Result<(), Error> {
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("\t")
        .create_writer(sink);

    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;
    writer.write(
        XmlEvent::start_element("kml")
            .default_ns(KML_NS)
            .ns("gx", GX_NS)
            .ns("kml", KML_NS)
            .ns("atom", ATOM_NS),
    )?;
    writer.write(XmlEvent::start_element("Document"))?;
    simple_element(&mut writer, "name", &format!("{}.kml", spec.display_name))?;
    write_styles(&mut writer)?;
    write_placemark(&mut writer, spec)?;
    writer.write(XmlEvent::end_element())?;
    writer.write(XmlEvent::end_element())?;

    let mut sink = writer.into_inner();
    writeln!(sink).map_err(xml::writer::Error::from)?;

    Ok(())
}

/// Write the static _StyleMap_ and the _Styles_ it references.
fn write_styles<W: Write>(writer: &mut EventWriter<W>) -> xml::writer::Result<()> {
    writer.write(XmlEvent::start_element("StyleMap").attr("id", STYLE_MAP_ID))?;
    for (key, (id, _)) in ["normal", "highlight"].iter().zip(STYLES) {
        writer.write(XmlEvent::start_element("Pair"))?;
        simple_element(writer, "key", key)?;
        simple_element(writer, "styleUrl", &format!("#{id}"))?;
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;

    for (id, scale) in STYLES {
        writer.write(XmlEvent::start_element("Style").attr("id", id))?;
        writer.write(XmlEvent::start_element("IconStyle"))?;
        simple_element(writer, "scale", scale)?;
        writer.write(XmlEvent::start_element("Icon"))?;
        simple_element(writer, "href", PUSHPIN_HREF)?;
        writer.write(XmlEvent::end_element())?;
        writer.write(
            XmlEvent::start_element("hotSpot")
                .attr("x", "20")
                .attr("y", "2")
                .attr("xunits", "pixels")
                .attr("yunits", "pixels"),
        )?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
    }

    Ok(())
}

/// Write the _Placemark_ with the line from base to destination.
fn write_placemark<W: Write>(
    writer: &mut EventWriter<W>,
    spec: &MissionSpec<'_>,
) -> xml::writer::Result<()> {
    writer.write(XmlEvent::start_element("Placemark"))?;
    simple_element(writer, "name", &spec.display_name)?;
    simple_element(writer, "styleUrl", &format!("#{STYLE_MAP_ID}"))?;

    writer.write(XmlEvent::start_element("LineString"))?;
    simple_element(writer, "tessellate", TESSELLATE)?;
    let coordinates = format!(
        "{} {}",
        coord_tuple(spec.base),
        coord_tuple(spec.destination)
    );
    simple_element(writer, "coordinates", &coordinates)?;
    writer.write(XmlEvent::end_element())?;

    let link = APP_LINK
        .iter()
        .fold(XmlEvent::start_element("atom:link"), |element, (name, value)| {
            element.attr(*name, value)
        });
    writer.write(link)?;
    writer.write(XmlEvent::end_element())?;

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Write an element `name` containing only the text `content`.
fn simple_element<W: Write>(
    writer: &mut EventWriter<W>,
    name: &str,
    content: &str,
) -> xml::writer::Result<()> {
    writer.write(XmlEvent::start_element(name))?;
    writer.write(XmlEvent::characters(content))?;
    writer.write(XmlEvent::end_element())
}

/// Format `point` as a KML `lon,lat,alt` tuple without losing precision.
fn coord_tuple(point: &Point) -> String {
    format!(
        "{},{},{}",
        point.longitude(),
        point.latitude(),
        point.altitude()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_points;

    fn render(name: &str, base: &Point, destination: &Point) -> String {
        let spec = MissionSpec {
            sequence_number: 7,
            display_name: name.to_string(),
            base,
            destination,
        };
        let mut sink = vec![];
        compose(&spec, &mut sink).expect("composing failed");
        String::from_utf8(sink).expect("invalid UTF-8")
    }

    #[test]
    fn file_name_is_zero_padded() {
        let point = Point::new(0.0, 0.0, 0.0);
        let mut spec = MissionSpec {
            sequence_number: 1,
            display_name: "27__Grove_South".to_string(),
            base: &point,
            destination: &point,
        };
        assert_eq!(spec.file_name(), "001_27__Grove_South.kml");

        spec.sequence_number = 1234;
        assert_eq!(spec.file_name(), "1234_27__Grove_South.kml");
    }

    #[test]
    fn document_has_required_structure() {
        let kml = render("Info_Center", &Point::new(1.0, 2.0, 3.0), &Point::new(4.0, 5.0, 6.0));

        assert!(kml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(kml.contains(r#"xmlns="http://www.opengis.net/kml/2.2""#));
        assert!(kml.contains(r#"xmlns:gx="http://www.google.com/kml/ext/2.2""#));
        assert!(kml.contains(r#"xmlns:atom="http://www.w3.org/2005/Atom""#));
        assert!(kml.contains(r#"<StyleMap id="m_ylw-pushpin">"#));
        assert!(kml.contains("<styleUrl>#s_ylw-pushpin_hl</styleUrl>"));
        assert!(kml.contains("<scale>1.3</scale>"));
        assert!(kml.contains(r#"x="20" y="2" xunits="pixels" yunits="pixels""#));
        assert!(kml.contains("<name>Info_Center</name>"));
        assert!(kml.contains("<styleUrl>#m_ylw-pushpin</styleUrl>"));
        assert!(kml.contains("<tessellate>1</tessellate>"));
        assert!(kml.contains("<coordinates>1,2,3 4,5,6</coordinates>"));
        assert!(kml.contains(r#"rel="app""#));
        assert!(kml.ends_with("</kml>\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let base = Point::new(-117.2738922672704, 49.10373549840682, 0.0);
        let destination = Point::new(-117.28, 49.11, 0.0);

        assert_eq!(
            render("A", &base, &destination),
            render("A", &base, &destination)
        );
    }

    #[test]
    fn only_name_and_coordinates_differ() {
        let first = render("First", &Point::new(1.0, 2.0, 0.0), &Point::new(3.0, 4.0, 0.0));
        let second = render("Other", &Point::new(5.0, 6.0, 0.0), &Point::new(7.0, 8.0, 0.0));

        let normalize = |kml: &str, name: &str, coords: &str| {
            kml.replace(name, "NAME").replace(coords, "COORDS")
        };
        assert_eq!(
            normalize(&first, "First", "1,2,0 3,4,0"),
            normalize(&second, "Other", "5,6,0 7,8,0")
        );
    }

    #[test]
    fn coordinates_keep_full_precision() {
        let base = Point::new(-117.2738922672704, 49.10373549840682, 0.0);
        let destination = Point::new(0.1 + 0.2, -1e-7, 1234.5678);

        let kml = render("P", &base, &destination);
        let read = extract_points(kml.as_bytes()).expect("output is not readable");

        // The reader keeps the first tuple of the line, which is the base.
        assert_eq!(read.points, vec![Point { raw_name: "P".into(), ..base }]);
        assert!(kml.contains(&format!("{},{},{}", 0.1 + 0.2, -1e-7, 1234.5678)));
    }
}
