// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

pub use std::f64::consts::{PI, TAU};

/// Band-limits are derived up to this multiple of the naive Nyquist frequency
/// set by the beam scale, i.e. `lmax = 1.4 * 2 pi / fwhm`.
pub const NYQUIST_FACTOR: f64 = 1.4;

/// The default total throughput of a beam (the integral of the beam over the
/// sphere). This makes b_00 = 1 / sqrt(4 pi).
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// The default polarisation callsign of a beam.
pub const DEFAULT_POL: &str = "A";

/// The default frequencies a detector is sensitive to [Hz].
pub const DEFAULT_SENSITIVE_FREQ_HZ: f64 = 1.5e9;

/// Ghost names are formed as `<parent>_<tag>`; this is the tag used when none
/// is given.
pub const DEFAULT_GHOST_TAG: &str = "ghost";

/// `sqrt(8 ln 2)`; divide a FWHM by this to get a Gaussian sigma.
pub const FWHM_TO_SIGMA: f64 = 2.3548200450309493;

/// The file extension assumed for dense coefficient arrays when none is given.
pub const NPY_EXTENSION: &str = "npy";

/// The file extension assumed for FITS alm files when none is given.
pub const FITS_EXTENSION: &str = "fits";

/// FITS keyword holding the maximum harmonic degree of an alm HDU.
pub const FITS_KEY_LMAX: &str = "MAX-LPOL";

/// FITS keyword holding the maximum azimuthal order of an alm HDU.
pub const FITS_KEY_MMAX: &str = "MAX-MPOL";
