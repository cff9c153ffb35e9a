// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading beam configuration from files.
//!
//! Beams may be described in toml or json files; the format is determined by
//! the file extension. A single beam is described by the fields of
//! [`BeamOptions`], e.g.
//!
//! ```toml
//! name = "det0"
//! btype = "PO"
//! po_file = "beams/det0_po"
//! lmax = 700
//!
//! [[ghosts]]
//! tag = "refl"
//! amplitude = 0.01
//! ```
//!
//! A focal plane is a list of beams under `[[beams]]`.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::beam::{Beam, BeamError, BeamOptions};

#[derive(Debug, Display, EnumIter, EnumString)]
pub enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{file}' doesn't have a recognised file extension! Valid extensions are: {}", *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnsupportedType { file: PathBuf },

    #[error("Couldn't decode toml structure from '{file}':\n{err}")]
    Toml {
        file: PathBuf,
        err: toml::de::Error,
    },

    #[error("Couldn't decode json structure from '{file}':\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Many beams, e.g. all the detectors of a focal plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalPlane {
    pub beams: Vec<BeamOptions>,
}

impl FocalPlane {
    /// Construct all beams (and their ghosts), in order.
    pub fn build(self) -> Result<Vec<Beam>, BeamError> {
        self.beams.into_iter().map(Beam::new).collect()
    }
}

fn read_config<T: DeserializeOwned>(file: &Path) -> Result<T, ConfigError> {
    debug!("Attempting to parse config file {}", file.display());
    let file_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| ConfigFileType::from_str(&e).ok())
        .ok_or_else(|| ConfigError::UnsupportedType {
            file: file.to_path_buf(),
        })?;

    let mut contents = String::new();
    File::open(file)?.read_to_string(&mut contents)?;
    match file_type {
        ConfigFileType::Toml => {
            debug!("Parsing toml file...");
            toml::from_str(&contents).map_err(|err| ConfigError::Toml {
                file: file.to_path_buf(),
                err,
            })
        }
        ConfigFileType::Json => {
            debug!("Parsing json file...");
            serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
                file: file.to_path_buf(),
                err,
            })
        }
    }
}

/// Read the options of a single beam (and its ghosts).
pub fn read_beam_options<P: AsRef<Path>>(file: P) -> Result<BeamOptions, ConfigError> {
    read_config(file.as_ref())
}

/// Read the options of many beams.
pub fn read_focal_plane<P: AsRef<Path>>(file: P) -> Result<FocalPlane, ConfigError> {
    read_config(file.as_ref())
}

/// Read a beam configuration file and construct the beam.
pub fn read_beam<P: AsRef<Path>>(file: P) -> Result<Beam, ConfigError> {
    Ok(Beam::new(read_beam_options(file)?)?)
}
