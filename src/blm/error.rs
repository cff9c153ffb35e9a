// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with harmonic-coefficient arithmetic.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlmError {
    #[error("An alm array with {size} elements doesn't correspond to any lmax (mmax = {mmax:?})")]
    BadSize { size: usize, mmax: Option<usize> },

    #[error("An alm array with lmax = {lmax} and mmax = {mmax} has too many elements to be stored")]
    TooLarge { lmax: usize, mmax: usize },

    #[error("The components of a blm triplet have different lengths ({co}, {minus2}, {plus2})")]
    TripletLengths {
        co: usize,
        minus2: usize,
        plus2: usize,
    },

    #[error("Cannot normalise beam coefficients with a zero b_00 component")]
    ZeroMonopole,
}
