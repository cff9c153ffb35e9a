// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Detector beams represented by spherical-harmonic coefficients, for use by
scanning and convolution simulators.

A [`Beam`] carries a detector's pointing offsets and the configuration needed
to produce its harmonic coefficients (a [`BlmTriplet`]), either by synthesising
a symmetric Gaussian or by loading `.npy`/`.fits` files. Primary beams may own
"ghosts": secondary beams that model optical leakage paths.
 */

pub mod beam;
pub mod blm;
pub mod config;
pub mod constants;
pub mod io;

// Re-exports.
pub use beam::{Beam, BeamError, BeamOptions, BeamType, GhostOptions, Role};
pub use blm::{BlmError, BlmTools, BlmTriplet, HealpixBlmTools, SharedBlm};
pub use constants::*;

// External re-exports.
pub use log::{debug, error, info, trace, warn};

/// Double-precision complex numbers; every harmonic coefficient is one of
/// these.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
