// Copyright 2023, 2026 Viktor Reusch
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

//! Command-line interface for the placemark-to-mission converter.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use kml_mission_convert::{run_batch, BatchConfig};

/// Create one DJI mission KML per destination placemark, each flying a
/// straight line from the base point to the destination.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// KML file whose first placemark is the base point.
    #[arg(long, value_name = "FILE", default_value = "base_kml/base.kml")]
    base: PathBuf,

    /// Directory containing the destination KML files.
    #[arg(long, value_name = "DIR", default_value = "input_points_kml")]
    input_dir: PathBuf,

    /// Directory receiving the mission files; existing files are replaced.
    #[arg(long, value_name = "DIR", default_value = "output_paths")]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = BatchConfig {
        base_file: args.base,
        input_dir: args.input_dir,
        output_dir: args.output_dir,
    };
    match run_batch(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Conversion failed: {err}");
            ExitCode::FAILURE
        }
    }
}
