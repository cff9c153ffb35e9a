// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beams.

use thiserror::Error;

use super::{BeamType, BEAM_TYPES_COMMA_SEPARATED};
use crate::{blm::BlmError, io::BlmReadError};

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("btype = {0} not recognized; supported beam types are: {}", *BEAM_TYPES_COMMA_SEPARATED)]
    UnknownBeamType(String),

    #[error("Neither lmax nor fwhm were specified; at least one is needed to derive the other")]
    MissingBandLimit,

    #[error("Cannot derive band-limits from lmax = {lmax:?} and fwhm = {fwhm:?} arcmin")]
    DegenerateBandLimit {
        lmax: Option<usize>,
        fwhm: Option<f64>,
    },

    #[error("Ghost cannot have ghosts")]
    GhostOfGhost,

    #[error("Ghost cannot have ghost_count")]
    GhostCountOnGhost,

    #[error("Main beam cannot have ghost_idx")]
    GhostIdxOnPrimary,

    #[error("btype = {btype} requires a blm file, but none was specified")]
    MissingBeamFile { btype: BeamType },

    #[error(transparent)]
    Read(#[from] BlmReadError),

    #[error(transparent)]
    Blm(#[from] BlmError),
}
