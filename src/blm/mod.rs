// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Beam harmonic coefficients ("blm").
//!
//! All coefficient arrays use the healpix packing: for band-limits `lmax` and
//! `mmax`, the coefficient of degree `l` and order `m` (`0 <= m <= mmax`,
//! `m <= l <= lmax`) lives at index `m * (2 lmax + 1 - m) / 2 + l`. This means
//! that arrays with the same `lmax` but a smaller `mmax` are a prefix of the
//! full (`mmax = lmax`) array.
//!
//! The heavy numerics (synthesising a Gaussian, deriving spin-2 coefficients
//! from a co-polar beam and rescaling coefficients) are abstracted by the
//! [`BlmTools`] trait, so that simulators may substitute their own routines.
//! [`HealpixBlmTools`] is the default implementation.

mod error;
mod tools;
#[cfg(test)]
mod tests;

pub use error::BlmError;
pub use tools::HealpixBlmTools;

use std::{cell::RefCell, rc::Rc};

use ndarray::prelude::*;

use crate::c64;

/// A handle to a [`BlmTriplet`] that may be shared between [`crate::Beam`]s.
///
/// Sharing is deliberate: many ghosts across a focal plane can represent the
/// same leakage optics, and each should not carry its own copy of the
/// coefficients. Any mutation made through one handle is visible through
/// every other handle.
pub type SharedBlm = Rc<RefCell<BlmTriplet>>;

/// The harmonic coefficients of a beam: the co-polar (spin-0) component and
/// the spin -2 and spin +2 polarised components. All three arrays have the
/// same length and healpix packing.
#[derive(Debug, Clone, PartialEq)]
pub struct BlmTriplet {
    pub co: Array1<c64>,
    pub minus2: Array1<c64>,
    pub plus2: Array1<c64>,
}

impl BlmTriplet {
    pub fn new(co: Array1<c64>, minus2: Array1<c64>, plus2: Array1<c64>) -> BlmTriplet {
        BlmTriplet { co, minus2, plus2 }
    }

    /// Get the three components, in (co, -2, +2) order.
    pub fn components(&self) -> [&Array1<c64>; 3] {
        [&self.co, &self.minus2, &self.plus2]
    }

    /// Get mutable references to the three components, in (co, -2, +2)
    /// order.
    pub fn components_mut(&mut self) -> [&mut Array1<c64>; 3] {
        [&mut self.co, &mut self.minus2, &mut self.plus2]
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for comp in self.components_mut() {
            comp.mapv_inplace(|b| b * factor);
        }
    }

    /// The harmonic degree limit of the (full, `mmax = lmax`) arrays. Fails if
    /// the components have different lengths or the length isn't a valid
    /// packed alm length.
    pub fn lmax(&self) -> Result<usize, BlmError> {
        let (co, minus2, plus2) = (self.co.len(), self.minus2.len(), self.plus2.len());
        if co != minus2 || co != plus2 {
            return Err(BlmError::TripletLengths { co, minus2, plus2 });
        }
        alm_lmax(co, None).ok_or(BlmError::BadSize {
            size: co,
            mmax: None,
        })
    }

    /// Wrap this triplet into a shareable handle.
    pub fn into_shared(self) -> SharedBlm {
        Rc::new(RefCell::new(self))
    }
}

impl From<(Array1<c64>, Array1<c64>, Array1<c64>)> for BlmTriplet {
    fn from((co, minus2, plus2): (Array1<c64>, Array1<c64>, Array1<c64>)) -> Self {
        BlmTriplet { co, minus2, plus2 }
    }
}

/// Options to [`BlmTools::scale_blm`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScaleOptions {
    /// Multiply coefficients by `sqrt(4 pi / (2 l + 1))`. Needed when the
    /// coefficients are true spherical-harmonic coefficients of the beam map.
    pub deconv_q: bool,

    /// Normalise all components so that the co-polar b_00 is 1. Happens after
    /// `deconv_q`.
    pub normalize: bool,
}

/// Options to [`BlmTools::copol_blm`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CopolOptions {
    pub scale: ScaleOptions,

    /// The FWHM [arcmin] of a Gaussian used to weight the spin +-2
    /// components. Only meaningful for (approximately) Gaussian beams.
    pub c2_fwhm: Option<f64>,
}

/// The numerical routines that [`crate::Beam`] needs to turn configuration
/// into coefficients.
pub trait BlmTools: std::fmt::Debug {
    /// Synthesise the co-polar coefficients of a symmetric Gaussian beam with
    /// the given FWHM [arcmin], band-limited to `lmax` (with `mmax = lmax`).
    /// b_00 must be `1 / sqrt(4 pi)`.
    fn gauss_blm(&self, fwhm_arcmin: f64, lmax: usize) -> Result<Array1<c64>, BlmError>;

    /// Given the co-polar coefficients of a beam, derive its spin -2 and spin
    /// +2 coefficients under the assumption that the beam is purely
    /// co-polarised.
    fn copol_blm(&self, blm: Array1<c64>, opts: &CopolOptions) -> Result<BlmTriplet, BlmError>;

    /// Rescale all components of a known triplet.
    fn scale_blm(&self, triplet: BlmTriplet, opts: &ScaleOptions)
        -> Result<BlmTriplet, BlmError>;
}

/// The number of elements in a packed alm array, or `None` if that number
/// doesn't fit in a `usize`.
pub fn checked_alm_size(lmax: usize, mmax: usize) -> Option<usize> {
    let mmax = mmax.min(lmax);
    let span = lmax.checked_mul(2)?.checked_add(1)? - mmax;
    (mmax.checked_mul(span)? / 2).checked_add(lmax)?.checked_add(1)
}

/// The number of elements in a packed alm array. Saturates at `usize::MAX`;
/// use [`checked_alm_size`] if `lmax` isn't already known to be sane.
pub fn alm_size(lmax: usize, mmax: usize) -> usize {
    checked_alm_size(lmax, mmax).unwrap_or(usize::MAX)
}

/// The index of the (`l`, `m`) coefficient in a packed alm array with degree
/// limit `lmax`. The index doesn't depend on `mmax`. Saturates rather than
/// overflowing.
pub fn alm_index(lmax: usize, l: usize, m: usize) -> usize {
    let span = lmax.saturating_mul(2).saturating_add(1).saturating_sub(m);
    (m.saturating_mul(span) / 2).saturating_add(l)
}

/// Given the length of a packed alm array and (optionally) its `mmax`, get its
/// `lmax`. If `mmax` isn't given, it is assumed to be equal to `lmax`. `None`
/// is returned if the length isn't valid.
pub fn alm_lmax(size: usize, mmax: Option<usize>) -> Option<usize> {
    if size == 0 {
        return None;
    }
    match mmax {
        Some(mmax) => {
            // size = (mmax + 1)(lmax + 1) - mmax (mmax + 1) / 2
            let numerator = size + mmax * (mmax + 1) / 2;
            if numerator % (mmax + 1) != 0 {
                return None;
            }
            let lmax = (numerator / (mmax + 1)).checked_sub(1)?;
            (lmax >= mmax).then_some(lmax)
        }
        None => {
            // size = (lmax + 1)(lmax + 2) / 2
            let disc = 1 + 8 * size;
            let root = (disc as f64).sqrt().round() as usize;
            if root * root != disc || root < 3 || (root - 3) % 2 != 0 {
                return None;
            }
            Some((root - 3) / 2)
        }
    }
}

/// The degree `l` of each element of a packed alm array, in storage order.
pub fn alm_degrees(lmax: usize, mmax: usize) -> Vec<usize> {
    let mmax = mmax.min(lmax);
    (0..=mmax).flat_map(|m| m..=lmax).collect()
}
