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

//! Library for turning [KML](https://developers.google.com/kml) placemarks
//! into drone mission paths.
//!
//! Every destination placemark becomes one KML mission file containing a
//! straight two-point _LineString_ from a fixed base point to the destination,
//! in the layout the DJI mission planner accepts.
//!
//! See [`run_batch`] for the whole pipeline, or [`extract_points`],
//! [`resolve_name`] and [`compose`] for the individual steps.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod batch;
mod mission;
mod name;
mod point;

pub use batch::{load_base_point, run_batch, BatchConfig, BatchSummary};
pub use mission::{compose, MissionSpec};
pub use name::{extract_annotation, resolve_name, sanitize, MAX_NAME_LEN, UNNAMED};
pub use point::{extract_points, Extraction, Point};

/// Use double precision for coordinate values.
pub type CoordValue = f64;

/// Error returned from the conversion functions.
#[derive(Error, Debug)]
pub enum Error {
    /// The base point file does not exist.
    #[error("base file not found: {}", .0.display())]
    MissingBaseFile(PathBuf),
    /// The base point file has no placemark with valid coordinates.
    #[error("no base point found in {}", .0.display())]
    NoBasePointFound(PathBuf),
    /// KML reading failed.
    #[error("reading KML failed: {0}")]
    Xml(#[from] xml::reader::Error),
    /// KML writing failed.
    #[error("writing KML failed: {0}")]
    Write(#[from] xml::writer::Error),
    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    /// Any other file system access failed.
    #[error("I/O on {} failed: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}
