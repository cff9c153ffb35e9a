// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing beam coefficient files.
//!
//! Two formats are supported: dense arrays written by `numpy.save` (`.npy`)
//! and healpy-style alm FITS files (`.fits`). [`read_blm_file`] always tries
//! the dense format first and falls back to FITS exactly once.

pub mod alm;
mod error;
pub(crate) mod fits;
pub mod npy;

pub use error::{BlmReadError, BlmWriteError};
pub use fits::FitsError;

use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array1;

use crate::{
    blm::BlmTriplet,
    c64,
    constants::{FITS_EXTENSION, NPY_EXTENSION},
};

/// The coefficients found in a file.
#[derive(Debug, Clone, PartialEq)]
pub enum BlmData {
    /// Only the co-polar blm.
    CoPolar(Array1<c64>),

    /// The co-polar and spin +-2 blm.
    Triplet(BlmTriplet),
}

/// The result of reading a blm file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBlm {
    pub data: BlmData,

    /// The azimuthal band-limit declared by the file, if it has one.
    pub mmax: Option<usize>,
}

/// Get the paths to attempt as (dense, FITS). If the supplied path has no
/// extension, the respective extensions are appended; otherwise the same file
/// is tried with both readers.
pub fn candidate_paths(file: &Path) -> (PathBuf, PathBuf) {
    match file.extension() {
        Some(_) => (file.to_path_buf(), file.to_path_buf()),
        None => (
            file.with_extension(NPY_EXTENSION),
            file.with_extension(FITS_EXTENSION),
        ),
    }
}

/// Read a blm file. The dense format is attempted first; if that fails, the
/// FITS format is attempted. Failing both is an error containing both
/// failures. Inconsistent FITS contents (e.g. mismatched `mmax` between
/// polarisation channels) are reported as-is.
pub fn read_blm_file<P: AsRef<Path>>(file: P) -> Result<LoadedBlm, BlmReadError> {
    let (npy_file, fits_file) = candidate_paths(file.as_ref());
    debug!("Attempting to read blm from {}", npy_file.display());
    let npy_error = match npy::read(&npy_file) {
        Ok(loaded) => return Ok(loaded),
        Err(e) => e,
    };

    debug!(
        "Couldn't read {} as a dense array ({npy_error}); trying {} as FITS",
        npy_file.display(),
        fits_file.display()
    );
    match alm::read(&fits_file) {
        Ok(loaded) => Ok(loaded),
        Err(fits_error) if fits_error.is_unreadable() => Err(BlmReadError::Unreadable {
            npy_file,
            npy_error: Box::new(npy_error),
            fits_file,
            fits_error: Box::new(fits_error),
        }),
        Err(e) => Err(e),
    }
}
