// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading or writing beam coefficient files.

use std::path::PathBuf;

use thiserror::Error;

use super::fits::FitsError;

#[derive(Error, Debug)]
pub enum BlmReadError {
    #[error("Couldn't read blm from {npy_file} ({npy_error}) nor from {fits_file} ({fits_error})")]
    Unreadable {
        npy_file: PathBuf,
        npy_error: Box<BlmReadError>,
        fits_file: PathBuf,
        fits_error: Box<BlmReadError>,
    },

    #[error("{file}: mmax does not match between s=0,-2,2 ({mmax:?}, {mmax_m2:?}, {mmax_p2:?})")]
    MmaxMismatch {
        file: String,
        mmax: Option<usize>,
        mmax_m2: Option<usize>,
        mmax_p2: Option<usize>,
    },

    #[error("{file}: expected a blm array with 1 or 2 dimensions, but it has {ndim}")]
    BadShape { file: String, ndim: usize },

    #[error("{file} HDU {hdu_num}: alm index {index} doesn't correspond to a valid (l, m)")]
    BadIndex {
        file: String,
        hdu_num: usize,
        index: i64,
    },

    #[error("{file} HDU {hdu_num}: the INDEX, REAL and IMAG columns have different lengths ({index}, {real}, {imag})")]
    ColumnLengths {
        file: String,
        hdu_num: usize,
        index: usize,
        real: usize,
        imag: usize,
    },

    #[error("{file} doesn't contain any alm HDUs")]
    NoAlmHdus { file: String },

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Npy(#[from] ndarray_npy::ReadNpyError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl BlmReadError {
    /// Is this error the result of a file being absent or not in the expected
    /// format? Errors that aren't (e.g. inconsistent contents) are never
    /// recovered from.
    pub(crate) fn is_unreadable(&self) -> bool {
        matches!(
            self,
            BlmReadError::Fits(_) | BlmReadError::Npy(_) | BlmReadError::Unreadable { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum BlmWriteError {
    #[error("Refusing to write an alm HDU with mmax ({mmax}) larger than lmax ({lmax})")]
    MmaxTooLarge { lmax: usize, mmax: usize },

    #[error("An alm array with {actual} elements doesn't correspond to any lmax")]
    BadLength { actual: usize },

    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Npy(#[from] ndarray_npy::WriteNpyError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
