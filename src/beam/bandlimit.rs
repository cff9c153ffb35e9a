// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Co-derivation of a beam's harmonic band-limit and its angular width.
//!
//! If only one of `lmax` and `fwhm` is known, the other is derived from it by
//! going up to 1.4 times the naive Nyquist frequency set by the beam scale:
//! `lmax = floor(1.4 * 2 pi / fwhm)`. Derivation only happens once, when a
//! beam is constructed; changing either value later never re-derives the
//! other.

use super::BeamError;
use crate::{
    blm::checked_alm_size,
    constants::{NYQUIST_FACTOR, TAU},
};

/// A consistent set of band-limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct BandLimits {
    pub(super) lmax: usize,
    pub(super) mmax: usize,
    /// [arcmin]
    pub(super) fwhm: f64,
}

/// Derive `lmax` from a FWHM [arcmin]. `None` if the FWHM is zero or not
/// finite, or so small that the coefficients couldn't be stored.
pub fn lmax_from_fwhm(fwhm_arcmin: f64) -> Option<usize> {
    let fwhm = fwhm_arcmin.abs();
    if !fwhm.is_finite() || fwhm == 0.0 {
        return None;
    }
    let lmax = (NYQUIST_FACTOR * TAU / (fwhm / 60.0).to_radians()).floor();
    if lmax >= usize::MAX as f64 {
        return None;
    }
    let lmax = lmax as usize;
    checked_alm_size(lmax, lmax).map(|_| lmax)
}

/// Derive a FWHM [arcmin] from `lmax`. `None` if `lmax` is zero.
pub fn fwhm_from_lmax(lmax: usize) -> Option<f64> {
    if lmax == 0 {
        return None;
    }
    Some((NYQUIST_FACTOR * TAU / lmax as f64).to_degrees() * 60.0)
}

/// `mmax` defaults to `lmax`, and can never exceed it.
pub fn resolve_mmax(mmax: Option<usize>, lmax: usize) -> usize {
    mmax.map_or(lmax, |mmax| mmax.min(lmax))
}

pub(super) fn resolve(
    lmax: Option<usize>,
    fwhm: Option<f64>,
    mmax: Option<usize>,
) -> Result<BandLimits, BeamError> {
    let degenerate = || BeamError::DegenerateBandLimit { lmax, fwhm };
    let (lmax, fwhm) = match (lmax, fwhm) {
        (Some(lmax), Some(fwhm)) => (lmax, fwhm.abs()),
        (Some(lmax), None) => (lmax, fwhm_from_lmax(lmax).ok_or_else(degenerate)?),
        (None, Some(fwhm)) => (lmax_from_fwhm(fwhm).ok_or_else(degenerate)?, fwhm.abs()),
        (None, None) => return Err(BeamError::MissingBandLimit),
    };

    Ok(BandLimits {
        lmax,
        mmax: resolve_mmax(mmax, lmax),
        fwhm,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_lmax_from_fwhm() {
        let expected = (1.4 * TAU / (43.0_f64 / 60.0).to_radians()).floor() as usize;
        assert_eq!(lmax_from_fwhm(43.0), Some(expected));
        assert_eq!(expected, 703);
        // The sign of the width doesn't matter.
        assert_eq!(lmax_from_fwhm(-43.0), Some(expected));
        assert_eq!(lmax_from_fwhm(0.0), None);
        assert_eq!(lmax_from_fwhm(f64::NAN), None);
    }

    #[test]
    fn test_derivation_is_one_directional() {
        for fwhm in [5.5, 7.3, 43.0, 300.0] {
            let lmax = lmax_from_fwhm(fwhm).unwrap();
            let rederived = fwhm_from_lmax(lmax).unwrap();
            assert_abs_diff_eq!(
                rederived,
                (1.4 * TAU / lmax as f64).to_degrees() * 60.0,
                epsilon = 1e-12
            );
            // Because of the floor, the width can only grow.
            assert!(rederived >= fwhm);
        }
        assert_eq!(fwhm_from_lmax(0), None);
    }

    #[test]
    fn test_resolve_mmax() {
        assert_eq!(resolve_mmax(None, 100), 100);
        assert_eq!(resolve_mmax(Some(20), 100), 20);
        assert_eq!(resolve_mmax(Some(200), 100), 100);
        assert_eq!(resolve_mmax(Some(0), 0), 0);
    }

    #[test]
    fn test_resolve() {
        let limits = resolve(None, Some(43.0), None).unwrap();
        assert_eq!(limits.lmax, 703);
        assert_eq!(limits.mmax, 703);
        assert_abs_diff_eq!(limits.fwhm, 43.0);

        let limits = resolve(Some(700), None, Some(4)).unwrap();
        assert_eq!(limits.lmax, 700);
        assert_eq!(limits.mmax, 4);
        assert_abs_diff_eq!(limits.fwhm, fwhm_from_lmax(700).unwrap());

        // Both supplied; neither is re-derived.
        let limits = resolve(Some(10), Some(-43.0), Some(50)).unwrap();
        assert_eq!(limits.lmax, 10);
        assert_eq!(limits.mmax, 10);
        assert_abs_diff_eq!(limits.fwhm, 43.0);

        assert!(matches!(
            resolve(None, None, Some(3)),
            Err(BeamError::MissingBandLimit)
        ));
        assert!(matches!(
            resolve(Some(0), None, None),
            Err(BeamError::DegenerateBandLimit { .. })
        ));
        assert!(matches!(
            resolve(None, Some(0.0), None),
            Err(BeamError::DegenerateBandLimit { .. })
        ));
    }

    #[test]
    fn test_tiny_fwhm_is_degenerate() {
        // lmax would be ~3e10, and the number of coefficients doesn't fit.
        assert_eq!(lmax_from_fwhm(1e-6), None);
        assert_eq!(lmax_from_fwhm(-1e-6), None);
        assert_eq!(lmax_from_fwhm(f64::MIN_POSITIVE), None);
        assert!(matches!(
            resolve(None, Some(1e-6), None),
            Err(BeamError::DegenerateBandLimit {
                lmax: None,
                fwhm: Some(_)
            })
        ));
        // Small, but storable.
        let lmax = lmax_from_fwhm(0.5).unwrap();
        assert!(checked_alm_size(lmax, lmax).is_some());
    }
}
