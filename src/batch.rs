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

//! Converting whole directories of placemarks.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::{compose, extract_points, resolve_name, Error, Extraction, MissionSpec, Point};

/// Extension of the documents read from the input directory.
const KML_EXTENSION: &str = "kml";

/// Locations used by [`run_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// KML file holding the base point.
    pub base_file: PathBuf,
    /// Directory scanned for destination KML files.
    pub input_dir: PathBuf,
    /// Directory receiving the mission files. Created if missing.
    pub output_dir: PathBuf,
}

/// Outcome of a successful [`run_batch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Mission files written, in sequence order.
    pub written: Vec<PathBuf>,
    /// Input documents which were unreadable or had no valid placemark.
    pub skipped_documents: usize,
    /// Placemarks dropped for missing or invalid coordinates.
    pub skipped_placemarks: usize,
}

/// Read the base point from the KML file at `path`.
///
/// The first valid placemark is used. Fails with [`Error::MissingBaseFile`]
/// if there is no such file and with [`Error::NoBasePointFound`] if it
/// contains no usable point.
pub fn load_base_point(path: &Path) -> Result<Point, Error> {
    if !path.is_file() {
        return Err(Error::MissingBaseFile(path.to_path_buf()));
    }

    let extraction = read_document(path).unwrap_or_else(|err| {
        warn!("Cannot read base file {}: {}", path.display(), err);
        Extraction::default()
    });
    let mut points = extraction.points.into_iter();
    let base = points
        .next()
        .ok_or_else(|| Error::NoBasePointFound(path.to_path_buf()))?;

    let ignored = points.count();
    if ignored > 0 {
        debug!("Ignoring {} further points in {}", ignored, path.display());
    }

    Ok(base)
}

/// Write one mission file per destination placemark.
///
/// All `*.kml` files of `config.input_dir` are read in path order. Every
/// valid placemark is numbered, starting at one, and written to
/// `config.output_dir` as `{number:03}_{name}.kml`, replacing existing files.
///
/// Unreadable documents and placemarks without coordinates are skipped with a
/// warning. Only problems with the base point or the output directory abort
/// the batch.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, Error> {
    info!("Reading base point...");
    let base = load_base_point(&config.base_file)?;
    info!("Base point: {}", base);

    fs::create_dir_all(&config.output_dir).map_err(|source| Error::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    info!("Reading destination points...");
    let mut summary = BatchSummary::default();
    let mut destinations = vec![];
    for document in list_documents(&config.input_dir)? {
        info!("Processing {}...", document.display());
        match read_document(&document) {
            Ok(extraction) => {
                summary.skipped_placemarks += extraction.skipped;
                if extraction.points.is_empty() {
                    warn!("No points found in {}", document.display());
                    summary.skipped_documents += 1;
                }
                destinations.extend(extraction.points);
            }
            Err(err) => {
                warn!("Skipping {}: {}", document.display(), err);
                summary.skipped_documents += 1;
            }
        }
    }

    if destinations.is_empty() {
        info!("No destination points found in {}", config.input_dir.display());
    } else {
        info!("Found {} destination points:", destinations.len());
        for destination in &destinations {
            info!("  - {}", destination);
        }
    }

    for (index, destination) in destinations.iter().enumerate() {
        if destination.annotation.is_none() {
            debug!("No annotation for {:?}, using its name", destination.raw_name);
        }
        let spec = MissionSpec {
            sequence_number: index + 1,
            display_name: resolve_name(destination),
            base: &base,
            destination,
        };
        let path = write_mission(&spec, &config.output_dir)?;
        info!("Created: {}", path.display());
        summary.written.push(path);
    }

    info!(
        "Processing complete! Created {} mission files, skipped {} documents and {} placemarks.",
        summary.written.len(),
        summary.skipped_documents,
        summary.skipped_placemarks
    );

    Ok(summary)
}

/// List the KML documents in `dir`, sorted by path.
///
/// A missing directory only yields a warning.
fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        warn!("Input points directory not found: {}", dir.display());
        return Ok(vec![]);
    }

    let io_error = |source: io::Error| Error::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut documents = vec![];
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_kml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(KML_EXTENSION));
        if is_kml && path.is_file() {
            documents.push(path);
        }
    }
    documents.sort();

    Ok(documents)
}

/// Extract the points of the KML file at `path`.
fn read_document(path: &Path) -> Result<Extraction, Error> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_points(BufReader::new(file))
}

/// Write the mission for `spec` into `output_dir` and return its path.
fn write_mission(spec: &MissionSpec<'_>, output_dir: &Path) -> Result<PathBuf, Error> {
    let path = output_dir.join(spec.file_name());
    let io_error = |source: io::Error| Error::Io {
        path: path.clone(),
        source,
    };

    let mut sink = BufWriter::new(File::create(&path).map_err(io_error)?);
    compose(spec, &mut sink)?;
    sink.flush().map_err(io_error)?;

    Ok(path)
}
