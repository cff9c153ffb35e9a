// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Default implementations of the blm numerics.

use ndarray::prelude::*;

use super::{
    alm_degrees, alm_index, alm_lmax, checked_alm_size, BlmError, BlmTools, BlmTriplet,
    CopolOptions, ScaleOptions,
};
use crate::{
    c64,
    constants::{FWHM_TO_SIGMA, PI},
};

/// Beam numerics following the healpix conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealpixBlmTools;

/// Convert a FWHM [arcmin] into a Gaussian sigma [radians].
fn fwhm_arcmin_to_sigma(fwhm_arcmin: f64) -> f64 {
    (fwhm_arcmin / 60.0).to_radians() / FWHM_TO_SIGMA
}

/// Multiply each coefficient by `sqrt(4 pi / (2 l + 1))`.
fn deconvolve_q(blm: &mut ArrayViewMut1<c64>, lmax: usize) {
    let q: Vec<f64> = (0..=lmax)
        .map(|l| (4.0 * PI / (2 * l + 1) as f64).sqrt())
        .collect();
    blm.iter_mut()
        .zip(alm_degrees(lmax, lmax))
        .for_each(|(b, l)| *b *= q[l]);
}

fn monopole(blm: &Array1<c64>) -> Result<c64, BlmError> {
    match blm.first() {
        Some(&b00) if b00 != c64::default() => Ok(b00),
        Some(_) => Err(BlmError::ZeroMonopole),
        None => Err(BlmError::BadSize {
            size: 0,
            mmax: None,
        }),
    }
}

impl BlmTools for HealpixBlmTools {
    fn gauss_blm(&self, fwhm_arcmin: f64, lmax: usize) -> Result<Array1<c64>, BlmError> {
        // ndarray can't allocate more than isize::MAX bytes.
        let size = checked_alm_size(lmax, lmax)
            .filter(|&n| {
                n.checked_mul(std::mem::size_of::<c64>())
                    .map_or(false, |bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(BlmError::TooLarge { lmax, mmax: lmax })?;
        let sigma = fwhm_arcmin_to_sigma(fwhm_arcmin);
        let sigma_2 = sigma * sigma;
        let mut blm = Array1::zeros(size);
        // The m = 0 coefficients occupy the first lmax + 1 elements.
        blm.iter_mut().take(lmax + 1).enumerate().for_each(|(l, b)| {
            let l = l as f64;
            let gauss = (-0.5 * l * (l + 1.0) * sigma_2).exp();
            *b = c64::new(gauss * ((2.0 * l + 1.0) / (4.0 * PI)).sqrt(), 0.0);
        });
        Ok(blm)
    }

    fn copol_blm(&self, blm: Array1<c64>, opts: &CopolOptions) -> Result<BlmTriplet, BlmError> {
        let lmax = alm_lmax(blm.len(), None).ok_or(BlmError::BadSize {
            size: blm.len(),
            mmax: None,
        })?;
        let mut blm = blm;
        if opts.scale.deconv_q {
            deconvolve_q(&mut blm.view_mut(), lmax);
        }
        if opts.scale.normalize {
            let b00 = monopole(&blm)?;
            blm.mapv_inplace(|b| b / b00);
        }

        // For a Gaussian, the spin-2 response falls off slightly slower than
        // the intensity response.
        let c2 = opts
            .c2_fwhm
            .map(|fwhm| {
                let sigma = fwhm_arcmin_to_sigma(fwhm);
                (2.0 * sigma * sigma).exp()
            })
            .unwrap_or(1.0);

        let mut blmm2 = Array1::zeros(blm.len());
        let mut blmp2 = Array1::zeros(blm.len());
        for m in 0..=lmax {
            for l in m.max(2)..=lmax {
                let i = alm_index(lmax, l, m);

                // -2 b_lm = b_l,m+2
                if m + 2 <= l {
                    blmm2[i] = blm[alm_index(lmax, l, m + 2)] * c2;
                }

                // +2 b_lm = b_l,m-2, with b_l,-m = (-1)^m conj(b_lm).
                let b = if m >= 2 {
                    blm[alm_index(lmax, l, m - 2)]
                } else {
                    let m_neg = 2 - m;
                    let b = blm[alm_index(lmax, l, m_neg)].conj();
                    if m_neg % 2 == 1 {
                        -b
                    } else {
                        b
                    }
                };
                blmp2[i] = b * c2;
            }
        }

        Ok(BlmTriplet::new(blm, blmm2, blmp2))
    }

    fn scale_blm(
        &self,
        mut triplet: BlmTriplet,
        opts: &ScaleOptions,
    ) -> Result<BlmTriplet, BlmError> {
        let lmax = triplet.lmax()?;
        if opts.deconv_q {
            for comp in triplet.components_mut() {
                deconvolve_q(&mut comp.view_mut(), lmax);
            }
        }
        if opts.normalize {
            let b00 = monopole(&triplet.co)?;
            for comp in triplet.components_mut() {
                comp.mapv_inplace(|b| b / b00);
            }
        }
        Ok(triplet)
    }
}
