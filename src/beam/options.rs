// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration used to construct beams and ghosts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::BeamType;
use crate::constants::{DEFAULT_AMPLITUDE, DEFAULT_GHOST_TAG, DEFAULT_POL, DEFAULT_SENSITIVE_FREQ_HZ};

/// Everything needed to construct a primary [`super::Beam`]. Every field may
/// be omitted from a configuration file, but at least one of `lmax` and
/// `fwhm` must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamOptions {
    /// Azimuthal location of the detector relative to boresight [degrees].
    pub az: f64,

    /// Elevation location of the detector relative to boresight [degrees].
    pub el: f64,

    /// The (nominal) polarisation orientation of the detector [degrees].
    pub polang: f64,

    /// Offset added to `polang` to get the true polarisation angle used to
    /// scan [degrees].
    pub polang_error: f64,

    /// Optional callsign of this beam.
    pub name: Option<String>,

    /// The polarisation callsign of the beam (e.g. A or B).
    pub pol: String,

    /// Identifier of the beam.
    pub idx: Option<usize>,

    /// Is the detector dead (not functioning)?
    pub dead: bool,

    /// The spatial response model.
    pub btype: BeamType,

    /// FWHM of the beam [arcmin]. Derived from `lmax` if not given.
    pub fwhm: Option<f64>,

    /// Harmonic band-limit. Derived from `fwhm` if not given.
    pub lmax: Option<usize>,

    /// Azimuthal band-limit. Defaults to `lmax`.
    pub mmax: Option<usize>,

    /// Frequencies the detector is sensitive to [Hz].
    pub sensitive_freq: Vec<f64>,

    /// Total throughput of the beam, i.e. the integral of the beam over the
    /// sphere. b_00 = amplitude / sqrt(4 pi).
    pub amplitude: f64,

    /// Path to a blm file for a physical-optics beam. The extension may be
    /// omitted.
    pub po_file: Option<PathBuf>,

    /// Path to a blm file for an elliptical Gaussian beam. The extension may
    /// be omitted.
    pub eg_file: Option<PathBuf>,

    /// Use the cross-polar response of loaded beams (if the file has it).
    pub cross_pol: bool,

    /// Multiply loaded blm by sqrt(4 pi / (2 l + 1)) before computing spin
    /// coefficients.
    pub deconv_q: bool,

    /// Normalise loaded blm such that b_00 is 1 (after `deconv_q`).
    pub normalize: bool,

    /// Is the beam azimuthally symmetric?
    pub symmetric: bool,

    /// Ghosts to spawn from this beam, in order.
    pub ghosts: Vec<GhostOptions>,
}

impl Default for BeamOptions {
    fn default() -> Self {
        BeamOptions {
            az: 0.0,
            el: 0.0,
            polang: 0.0,
            polang_error: 0.0,
            name: None,
            pol: DEFAULT_POL.to_string(),
            idx: None,
            dead: false,
            btype: BeamType::default(),
            fwhm: None,
            lmax: None,
            mmax: None,
            sensitive_freq: vec![DEFAULT_SENSITIVE_FREQ_HZ],
            amplitude: DEFAULT_AMPLITUDE,
            po_file: None,
            eg_file: None,
            cross_pol: true,
            deconv_q: true,
            normalize: true,
            symmetric: false,
            ghosts: vec![],
        }
    }
}

/// Overrides applied when spawning a ghost. Anything left as `None` is copied
/// from the primary beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostOptions {
    /// The ghost is named `<primary name>_<tag>`. If empty or `None`, the
    /// primary's name is used.
    pub tag: Option<String>,

    pub idx: Option<usize>,
    pub az: Option<f64>,
    pub el: Option<f64>,
    pub polang: Option<f64>,
    pub polang_error: Option<f64>,
    pub pol: Option<String>,
    pub dead: Option<bool>,
    pub btype: Option<BeamType>,
    pub fwhm: Option<f64>,
    pub lmax: Option<usize>,
    pub mmax: Option<usize>,
    pub sensitive_freq: Option<Vec<f64>>,
    pub amplitude: Option<f64>,
    pub po_file: Option<PathBuf>,
    pub eg_file: Option<PathBuf>,
    pub cross_pol: Option<bool>,
    pub deconv_q: Option<bool>,
    pub normalize: Option<bool>,
    pub symmetric: Option<bool>,
}

impl Default for GhostOptions {
    fn default() -> Self {
        GhostOptions {
            tag: Some(DEFAULT_GHOST_TAG.to_string()),
            idx: None,
            az: None,
            el: None,
            polang: None,
            polang_error: None,
            pol: None,
            dead: None,
            btype: None,
            fwhm: None,
            lmax: None,
            mmax: None,
            sensitive_freq: None,
            amplitude: None,
            po_file: None,
            eg_file: None,
            cross_pol: None,
            deconv_q: None,
            normalize: None,
            symmetric: None,
        }
    }
}

impl GhostOptions {
    /// Overwrite the fields of `opts` with any overrides that are set.
    pub(super) fn apply(self, opts: &mut BeamOptions) {
        macro_rules! override_fields {
            ($($field:ident),*) => {
                $(
                    if let Some(v) = self.$field {
                        opts.$field = v;
                    }
                )*
            };
        }
        override_fields!(
            az,
            el,
            polang,
            polang_error,
            pol,
            dead,
            btype,
            sensitive_freq,
            amplitude,
            cross_pol,
            deconv_q,
            normalize,
            symmetric
        );

        // These are optional on a beam, too.
        if self.idx.is_some() {
            opts.idx = self.idx;
        }
        if self.fwhm.is_some() {
            opts.fwhm = self.fwhm;
        }
        if self.lmax.is_some() {
            opts.lmax = self.lmax;
        }
        if self.mmax.is_some() {
            opts.mmax = self.mmax;
        }
        if self.po_file.is_some() {
            opts.po_file = self.po_file;
        }
        if self.eg_file.is_some() {
            opts.eg_file = self.eg_file;
        }
    }
}
