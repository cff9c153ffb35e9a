// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Detector beams.
//!
//! A [`Beam`] is the angular response of a detector, represented by its
//! spherical-harmonic coefficients ("blm"). Nothing expensive happens when a
//! beam is constructed; the coefficients are synthesised or loaded on first
//! access (see [`Beam::blm`]) and cached until explicitly deleted.
//!
//! A primary beam may own "ghosts": secondary beams representing optical
//! leakage paths. Ghosts are beams themselves, but can't own ghosts of their
//! own.

mod bandlimit;
mod coefficients;
mod error;
mod ghosts;
mod options;

pub use bandlimit::{fwhm_from_lmax, lmax_from_fwhm, resolve_mmax};
pub use error::BeamError;
pub use options::{BeamOptions, GhostOptions};

use std::{fmt::Display, path::PathBuf, rc::Rc, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::blm::{BlmTools, HealpixBlmTools, SharedBlm};

/// Supported beam types.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    Serialize,
    Deserialize,
)]
pub enum BeamType {
    /// A symmetric Gaussian, synthesised from the FWHM.
    #[default]
    #[strum(serialize = "Gaussian")]
    Gaussian,

    /// Coefficients of a physical-optics simulation, loaded from `po_file`.
    #[strum(to_string = "PO", serialize = "PhysicalOptics")]
    #[serde(rename = "PO", alias = "PhysicalOptics")]
    PhysicalOptics,

    /// Coefficients of an elliptical Gaussian, loaded from `eg_file`.
    #[strum(to_string = "EG", serialize = "EllipticalGaussian")]
    #[serde(rename = "EG", alias = "EllipticalGaussian")]
    EllipticalGaussian,
}

lazy_static::lazy_static! {
    pub(crate) static ref BEAM_TYPES_COMMA_SEPARATED: String = BeamType::iter().join(", ");
}

impl BeamType {
    /// Parse a beam type tag (e.g. "Gaussian", "PO", "EG").
    pub fn parse(s: &str) -> Result<BeamType, BeamError> {
        BeamType::from_str(s).map_err(|_| BeamError::UnknownBeamType(s.to_string()))
    }
}

/// Whether a beam is a primary or a ghost. Fixed at construction.
#[derive(Debug)]
pub enum Role {
    Primary {
        /// The `ghost_idx` that the next spawned ghost will get.
        ghost_count: usize,

        /// Owned ghosts, in order of creation.
        ghosts: Vec<Beam>,
    },

    Ghost {
        /// Ghosts with the same `ghost_idx` are meant to share coefficients.
        ghost_idx: usize,
    },
}

/// A detector beam.
///
/// The public fields are configuration that may be changed at any time. Note
/// that changing configuration (e.g. `btype`) after the coefficients have been
/// computed does not invalidate them; use [`Beam::delete_blm`] for that.
#[derive(Debug)]
pub struct Beam {
    pub name: Option<String>,

    /// Polarisation callsign (e.g. A or B).
    pub pol: String,

    /// [degrees]
    pub az: f64,

    /// [degrees]
    pub el: f64,

    /// Nominal polarisation angle, used for analysis [degrees].
    pub polang: f64,

    /// Added to `polang` to get the angle used to scan [degrees].
    pub polang_error: f64,

    pub btype: BeamType,
    pub po_file: Option<PathBuf>,
    pub eg_file: Option<PathBuf>,
    pub cross_pol: bool,
    pub deconv_q: bool,
    pub normalize: bool,
    pub amplitude: f64,
    pub symmetric: bool,

    /// [Hz]
    pub sensitive_freq: Vec<f64>,

    idx: Option<usize>,
    dead: bool,
    role: Role,
    lmax: usize,
    mmax: usize,

    /// [arcmin]
    fwhm: f64,

    blm: Option<SharedBlm>,
    tools: Rc<dyn BlmTools>,
}

impl Beam {
    /// Create a primary beam, along with any ghosts declared in `opts`. The
    /// default blm numerics are used.
    pub fn new(opts: BeamOptions) -> Result<Beam, BeamError> {
        Beam::with_tools(opts, Rc::new(HealpixBlmTools))
    }

    /// Create a primary beam (and its declared ghosts) that uses the supplied
    /// blm numerics. Ghosts share the same numerics.
    pub fn with_tools(mut opts: BeamOptions, tools: Rc<dyn BlmTools>) -> Result<Beam, BeamError> {
        let ghost_opts = std::mem::take(&mut opts.ghosts);
        let mut beam = Beam::build(
            opts,
            Role::Primary {
                ghost_count: 0,
                ghosts: vec![],
            },
            tools,
        )?;
        for g in ghost_opts {
            beam.create_ghost(g)?;
        }
        Ok(beam)
    }

    fn build(opts: BeamOptions, role: Role, tools: Rc<dyn BlmTools>) -> Result<Beam, BeamError> {
        let limits = bandlimit::resolve(opts.lmax, opts.fwhm, opts.mmax)?;
        Ok(Beam {
            name: opts.name,
            pol: opts.pol,
            az: opts.az,
            el: opts.el,
            polang: opts.polang,
            polang_error: opts.polang_error,
            btype: opts.btype,
            po_file: opts.po_file,
            eg_file: opts.eg_file,
            cross_pol: opts.cross_pol,
            deconv_q: opts.deconv_q,
            normalize: opts.normalize,
            amplitude: opts.amplitude,
            symmetric: opts.symmetric,
            sensitive_freq: opts.sensitive_freq,
            idx: opts.idx,
            dead: opts.dead,
            role,
            lmax: limits.lmax,
            mmax: limits.mmax,
            fwhm: limits.fwhm,
            blm: None,
            tools,
        })
    }

    /// A snapshot of this beam's current configuration. Ghosts aren't
    /// included.
    pub fn options(&self) -> BeamOptions {
        BeamOptions {
            az: self.az,
            el: self.el,
            polang: self.polang,
            polang_error: self.polang_error,
            name: self.name.clone(),
            pol: self.pol.clone(),
            idx: self.idx,
            dead: self.dead,
            btype: self.btype,
            fwhm: Some(self.fwhm),
            lmax: Some(self.lmax),
            mmax: Some(self.mmax),
            sensitive_freq: self.sensitive_freq.clone(),
            amplitude: self.amplitude,
            po_file: self.po_file.clone(),
            eg_file: self.eg_file.clone(),
            cross_pol: self.cross_pol,
            deconv_q: self.deconv_q,
            normalize: self.normalize,
            symmetric: self.symmetric,
            ghosts: vec![],
        }
    }

    pub fn idx(&self) -> Option<usize> {
        self.idx
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.role, Role::Ghost { .. })
    }

    pub fn dead(&self) -> bool {
        self.dead
    }

    /// Set whether this beam is dead. On a primary beam, all ghosts are given
    /// the same status.
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
        if let Role::Primary { ghosts, .. } = &mut self.role {
            for ghost in ghosts {
                ghost.dead = dead;
            }
        }
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    /// Set the harmonic band-limit. The FWHM is not re-derived, but `mmax` is
    /// clamped to the new value.
    pub fn set_lmax(&mut self, lmax: usize) {
        self.lmax = lmax;
        self.mmax = self.mmax.min(lmax);
    }

    pub fn mmax(&self) -> usize {
        self.mmax
    }

    /// Set the azimuthal band-limit; `None` means `lmax`. Never exceeds `lmax`.
    pub fn set_mmax(&mut self, mmax: Option<usize>) {
        self.mmax = resolve_mmax(mmax, self.lmax);
    }

    /// [arcmin]
    pub fn fwhm(&self) -> f64 {
        self.fwhm
    }

    /// Set the FWHM [arcmin]. Only the magnitude is used. `lmax` is not
    /// re-derived.
    pub fn set_fwhm(&mut self, fwhm: f64) {
        self.fwhm = fwhm.abs();
    }

    /// The polarisation angle used to scan [degrees].
    pub fn polang_truth(&self) -> f64 {
        self.polang + self.polang_error
    }

    /// The (unrotated) detector offsets: azimuth, elevation and polarisation
    /// angle with the error applied [degrees].
    pub fn get_offsets(&self) -> (f64, f64, f64) {
        (self.az, self.el, self.polang_truth())
    }
}

impl Display for Beam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "name    : {}", self.name.as_deref().unwrap_or("None"))?;
        writeln!(f, "btype   : {}", self.btype)?;
        writeln!(f, "alive   : {}", !self.dead)?;
        writeln!(f, "FWHM    : {} arcmin", self.fwhm)?;
        writeln!(f, "az      : {} deg", self.az)?;
        writeln!(f, "el      : {} deg", self.el)?;
        writeln!(f, "polang  : {} deg", self.polang_truth())?;
        match &self.po_file {
            Some(po_file) => writeln!(f, "po_file : {}", po_file.display()),
            None => writeln!(f, "po_file : None"),
        }
    }
}
