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

//! Reading KML _Placemarks_ into [`Point`]s.

use std::fmt;
use std::io::Read;

use kml::types::Coord;
use log::warn;
use xml::reader::{ParserConfig, XmlEvent};

use crate::name::extract_annotation;
use crate::{CoordValue, Error};

/// Altitude used when a coordinate tuple has none (or an unreadable one).
const DEFAULT_ALTITUDE: CoordValue = 0.0;

/// A single located placemark.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// Longitude (`x`), latitude (`y`) and altitude (`z`, always set).
    pub coord: Coord<CoordValue>,
    /// Content of the placemark's _name_ element, possibly empty.
    pub raw_name: String,
    /// Label found in the first styled table row of the description.
    pub annotation: Option<String>,
}

impl Point {
    /// Create an unnamed point.
    pub fn new(longitude: CoordValue, latitude: CoordValue, altitude: CoordValue) -> Self {
        Self {
            coord: Coord {
                x: longitude,
                y: latitude,
                z: Some(altitude),
            },
            raw_name: String::new(),
            annotation: None,
        }
    }

    pub fn longitude(&self) -> CoordValue {
        self.coord.x
    }

    pub fn latitude(&self) -> CoordValue {
        self.coord.y
    }

    pub fn altitude(&self) -> CoordValue {
        self.coord.z.unwrap_or(DEFAULT_ALTITUDE)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.raw_name.is_empty() {
            write!(f, "{} ", self.raw_name)?;
        }
        write!(
            f,
            "({}, {}, {})",
            self.longitude(),
            self.latitude(),
            self.altitude()
        )?;
        if let Some(ref annotation) = self.annotation {
            write!(f, " [{}]", annotation)?;
        }
        Ok(())
    }
}

/// Result of [`extract_points`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    /// Valid points in document order.
    pub points: Vec<Point>,
    /// Number of placemarks dropped for missing or unreadable coordinates.
    pub skipped: usize,
}

/// Child elements of a _Placemark_ whose text is collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Coordinates,
}

impl Field {
    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Field::Name),
            "description" => Some(Field::Description),
            "coordinates" => Some(Field::Coordinates),
            _ => None,
        }
    }
}

/// Text collected for the _Placemark_ currently being read.
#[derive(Default)]
struct PendingPlacemark {
    name: Option<String>,
    description: Option<String>,
    coordinates: Option<String>,
}

impl PendingPlacemark {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Coordinates => &mut self.coordinates,
        }
    }

    /// Turn the collected text into a [`Point`].
    ///
    /// Returns `None` if the coordinates are missing or unreadable.
    fn finish(self) -> Option<Point> {
        let coord = parse_coord(self.coordinates.as_deref()?)?;
        let annotation = self.description.as_deref().and_then(extract_annotation);

        Some(Point {
            coord,
            raw_name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            annotation,
        })
    }
}

/// Read all _Placemarks_ from the KML document in `source`.
///
/// Elements are matched by their local name, so the KML namespace is
/// optional. Placemarks without readable coordinates are counted in
/// [`Extraction::skipped`]. An error is only returned if `source` is not
/// well-formed XML.
///
/// # Example
/// ```
/// # use kml_mission_convert::extract_points;
/// #
/// let source = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
///     <Placemark>
///         <name>Info Center</name>
///         <Point><coordinates>-117.27,49.10,5</coordinates></Point>
///     </Placemark>
/// </kml>
/// "#;
///
/// let extraction = extract_points(source.as_bytes()).expect("invalid KML");
///
/// assert_eq!(extraction.points.len(), 1);
/// assert_eq!(extraction.points[0].raw_name, "Info Center");
/// assert_eq!(extraction.points[0].longitude(), -117.27);
/// assert_eq!(extraction.points[0].altitude(), 5.0);
/// ```
pub fn extract_points(source: impl Read) -> Result<Extraction, Error> {
    let reader = ParserConfig::new()
        .cdata_to_characters(true)
        .create_reader(source);

    let mut extraction = Extraction::default();
    let mut placemark: Option<PendingPlacemark> = None;
    // Field being collected and the element depth it was opened at.
    let mut field: Option<(Field, usize, String)> = None;
    let mut depth = 0;

    for event in reader {
        match event? {
            XmlEvent::StartElement { name, .. } => {
                depth += 1;
                if name.local_name == "Placemark" {
                    placemark = Some(PendingPlacemark::default());
                    field = None;
                } else if field.is_none() {
                    let wanted = Field::from_local_name(&name.local_name);
                    if let (Some(pending), Some(f)) = (placemark.as_mut(), wanted) {
                        // Only the first occurrence counts.
                        if pending.slot(f).is_none() {
                            field = Some((f, depth, String::new()));
                        }
                    }
                }
            }
            XmlEvent::Characters(text) => {
                if let Some((_, _, ref mut buffer)) = field {
                    buffer.push_str(&text);
                }
            }
            XmlEvent::EndElement { name } => {
                if matches!(field, Some((_, opened_at, _)) if opened_at == depth) {
                    if let (Some(pending), Some((f, _, text))) = (placemark.as_mut(), field.take()) {
                        *pending.slot(f) = Some(text);
                    }
                }
                if name.local_name == "Placemark" {
                    if let Some(pending) = placemark.take() {
                        let label = pending.name.clone().unwrap_or_default();
                        match pending.finish() {
                            Some(point) => extraction.points.push(point),
                            None => {
                                warn!("Skipping placemark {:?}: missing or invalid coordinates", label.trim());
                                extraction.skipped += 1;
                            }
                        }
                    }
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    Ok(extraction)
}

/// Parse the first `lon,lat[,alt]` tuple of a KML _coordinates_ string.
///
/// Blanks around the commas are tolerated. Whitespace inside a component
/// separates tuples, so everything after it is ignored.
fn parse_coord(text: &str) -> Option<Coord<CoordValue>> {
    let mut components = Vec::with_capacity(3);
    for part in text.trim().split(',') {
        let mut tokens = part.split_whitespace();
        components.push(tokens.next().unwrap_or_default());
        if tokens.next().is_some() || components.len() == 3 {
            break;
        }
    }

    let x = parse_component(components.first()?)?;
    let y = parse_component(components.get(1)?)?;
    let z = components
        .get(2)
        .and_then(|z| parse_component(z))
        .unwrap_or(DEFAULT_ALTITUDE);

    Some(Coord { x, y, z: Some(z) })
}

fn parse_component(text: &str) -> Option<CoordValue> {
    text.trim()
        .parse::<CoordValue>()
        .ok()
        .filter(|v| v.is_finite())
}
