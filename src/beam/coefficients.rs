// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Getting a beam's coefficients: synthesised, loaded from a file or set
//! explicitly, and cached.

use std::{path::Path, rc::Rc};

use log::{debug, trace};

use super::{Beam, BeamError, BeamType};
use crate::{
    blm::{BlmTriplet, CopolOptions, ScaleOptions, SharedBlm},
    io::{read_blm_file, BlmData},
};

impl Beam {
    /// Get the coefficients of this beam, computing or loading them if they
    /// aren't cached. The returned handle is shared with this beam (and any
    /// beams that reuse its coefficients).
    pub fn blm(&mut self) -> Result<SharedBlm, BeamError> {
        if let Some(blm) = &self.blm {
            trace!("Using cached blm of {}", self.label());
            return Ok(Rc::clone(blm));
        }

        let (triplet, mmax) = match self.btype {
            BeamType::Gaussian => (self.gaussian_triplet()?, None),
            BeamType::PhysicalOptics | BeamType::EllipticalGaussian => {
                let file = match self.btype {
                    BeamType::PhysicalOptics => self.po_file.clone(),
                    _ => self.eg_file.clone(),
                }
                .ok_or(BeamError::MissingBeamFile { btype: self.btype })?;
                self.file_triplet(&file)?
            }
        };
        self.narrow_mmax(mmax);
        let blm = triplet.into_shared();
        self.blm = Some(Rc::clone(&blm));
        Ok(blm)
    }

    /// Are the coefficients cached?
    pub fn has_blm(&self) -> bool {
        self.blm.is_some()
    }

    /// Replace the coefficients with the supplied ones.
    pub fn set_blm(&mut self, triplet: BlmTriplet) {
        self.blm = Some(triplet.into_shared());
    }

    /// Drop the cached coefficients (if any), so that the next call to
    /// [`Beam::blm`] computes them again. If `del_ghosts_blm` is true, the
    /// same is done for all ghosts. Other beams sharing the coefficients keep
    /// their handles.
    pub fn delete_blm(&mut self, del_ghosts_blm: bool) {
        if self.blm.take().is_some() {
            trace!("Deleted blm of {}", self.label());
        }
        if del_ghosts_blm {
            for ghost in self.ghosts_mut() {
                ghost.delete_blm(false);
            }
        }
    }

    /// Synthesise symmetric Gaussian coefficients using the FWHM and `lmax`,
    /// scaled by `amplitude`, and cache them. This also sets `btype` to
    /// Gaussian.
    pub fn gen_gaussian_blm(&mut self) -> Result<(), BeamError> {
        let triplet = self.gaussian_triplet()?;
        self.btype = BeamType::Gaussian;
        self.blm = Some(triplet.into_shared());
        Ok(())
    }

    /// Load coefficients from a file (see [`read_blm_file`]), scale them by
    /// `amplitude` and cache them. The `deconv_q`, `normalize` and
    /// `cross_pol` settings of this beam are respected. If the file declares
    /// an `mmax` smaller than this beam's, this beam's `mmax` is narrowed.
    ///
    /// Nothing about this beam changes if loading fails.
    pub fn load_blm<P: AsRef<Path>>(&mut self, file: P) -> Result<(), BeamError> {
        let (triplet, mmax) = self.file_triplet(file.as_ref())?;
        self.narrow_mmax(mmax);
        self.blm = Some(triplet.into_shared());
        Ok(())
    }

    fn gaussian_triplet(&self) -> Result<BlmTriplet, BeamError> {
        debug!(
            "Generating Gaussian blm for {} (fwhm = {} arcmin, lmax = {})",
            self.label(),
            self.fwhm,
            self.lmax
        );
        let mut blm = self.tools.gauss_blm(self.fwhm, self.lmax)?;
        blm.mapv_inplace(|b| b * self.amplitude);
        let triplet = self.tools.copol_blm(
            blm,
            &CopolOptions {
                scale: ScaleOptions::default(),
                c2_fwhm: Some(self.fwhm),
            },
        )?;
        Ok(triplet)
    }

    /// Read a file and turn its contents into a scaled triplet. The `mmax`
    /// declared by the file is returned alongside.
    fn file_triplet(&self, file: &Path) -> Result<(BlmTriplet, Option<usize>), BeamError> {
        debug!("Loading blm for {} from {}", self.label(), file.display());
        let loaded = read_blm_file(file)?;
        let scale = ScaleOptions {
            deconv_q: self.deconv_q,
            normalize: self.normalize,
        };

        let triplet = match loaded.data {
            BlmData::Triplet(triplet) if self.cross_pol => {
                let mut triplet = self.tools.scale_blm(triplet, &scale)?;
                triplet.scale(self.amplitude);
                triplet
            }

            data => {
                let mut co = match data {
                    BlmData::Triplet(triplet) => triplet.co,
                    BlmData::CoPolar(co) => co,
                };
                co.mapv_inplace(|b| b * self.amplitude);
                self.tools.copol_blm(
                    co,
                    &CopolOptions {
                        scale,
                        c2_fwhm: None,
                    },
                )?
            }
        };
        Ok((triplet, loaded.mmax))
    }

    /// `mmax` only ever narrows; an unspecified value changes nothing.
    fn narrow_mmax(&mut self, mmax: Option<usize>) {
        if let Some(mmax) = mmax {
            if mmax < self.mmax {
                debug!(
                    "Narrowing mmax of {} from {} to {mmax}",
                    self.label(),
                    self.mmax
                );
                self.mmax = mmax;
            }
        }
    }

    /// A short description of this beam for log messages.
    pub(super) fn label(&self) -> String {
        match (&self.name, self.idx) {
            (Some(name), _) => format!("beam '{name}'"),
            (None, Some(idx)) => format!("beam {idx}"),
            (None, None) => "unnamed beam".to_string(),
        }
    }
}
