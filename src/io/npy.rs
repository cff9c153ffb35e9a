// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dense blm arrays stored with `numpy.save`.
//!
//! A file holds either a single complex array (the co-polar blm) or a (3, N)
//! array of (blm, blmm2, blmp2). Single-precision and real-valued arrays are
//! accepted and promoted to complex128.

use std::path::Path;

use log::trace;
use ndarray::prelude::*;
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use num_complex::Complex;

use super::{BlmData, BlmReadError, BlmWriteError, LoadedBlm};
use crate::{blm::BlmTriplet, c64};

fn read_complex(file: &Path) -> Result<ArrayD<c64>, ReadNpyError> {
    match read_npy::<_, ArrayD<c64>>(file) {
        Err(ReadNpyError::WrongDescriptor(_)) => (),
        result => return result,
    }

    trace!("{} isn't complex128; trying complex64", file.display());
    match read_npy::<_, ArrayD<Complex<f32>>>(file) {
        Ok(a) => return Ok(a.mapv(|b| c64::new(b.re.into(), b.im.into()))),
        Err(ReadNpyError::WrongDescriptor(_)) => (),
        Err(e) => return Err(e),
    }

    trace!("{} isn't complex64; trying float64", file.display());
    match read_npy::<_, ArrayD<f64>>(file) {
        Ok(a) => return Ok(a.mapv(|re| c64::new(re, 0.0))),
        Err(ReadNpyError::WrongDescriptor(_)) => (),
        Err(e) => return Err(e),
    }

    trace!("{} isn't float64; trying float32", file.display());
    let a: ArrayD<f32> = read_npy(file)?;
    Ok(a.mapv(|re| c64::new(re.into(), 0.0)))
}

pub(super) fn read(file: &Path) -> Result<LoadedBlm, BlmReadError> {
    let array = read_complex(file)?;
    let data = match array.ndim() {
        1 => BlmData::CoPolar(array.into_dimensionality::<Ix1>()?),
        2 => {
            let array = array.into_dimensionality::<Ix2>()?;
            if array.nrows() == 3 {
                BlmData::Triplet(BlmTriplet::from((
                    array.row(0).to_owned(),
                    array.row(1).to_owned(),
                    array.row(2).to_owned(),
                )))
            } else {
                // Only the first row can be interpreted.
                BlmData::CoPolar(array.row(0).to_owned())
            }
        }
        ndim => {
            return Err(BlmReadError::BadShape {
                file: file.display().to_string(),
                ndim,
            })
        }
    };

    // Dense arrays carry no azimuthal band-limit of their own.
    Ok(LoadedBlm { data, mmax: None })
}

/// Write a co-polar blm array to a `.npy` file.
pub fn write_blm<P: AsRef<Path>>(file: P, blm: ArrayView1<c64>) -> Result<(), BlmWriteError> {
    write_npy(file, &blm)?;
    Ok(())
}

/// Write a blm triplet to a `.npy` file as a (3, N) array.
pub fn write_triplet<P: AsRef<Path>>(file: P, triplet: &BlmTriplet) -> Result<(), BlmWriteError> {
    let stacked = ndarray::stack(
        Axis(0),
        &[
            triplet.co.view(),
            triplet.minus2.view(),
            triplet.plus2.view(),
        ],
    )?;
    write_npy(file, &stacked)?;
    Ok(())
}
