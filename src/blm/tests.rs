// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;
use crate::constants::PI;

#[test]
fn test_alm_size_and_lmax() {
    assert_eq!(alm_size(0, 0), 1);
    assert_eq!(alm_size(2, 2), 6);
    assert_eq!(alm_size(3, 1), 7);
    assert_eq!(alm_size(700, 700), 246051);

    for lmax in [0, 1, 2, 7, 100] {
        assert_eq!(alm_lmax(alm_size(lmax, lmax), None), Some(lmax));
        for mmax in 0..=lmax.min(5) {
            assert_eq!(alm_lmax(alm_size(lmax, mmax), Some(mmax)), Some(lmax));
        }
    }

    assert_eq!(alm_lmax(0, None), None);
    assert_eq!(alm_lmax(4, None), None);
    assert_eq!(alm_lmax(5, Some(1)), Some(2));
    assert_eq!(alm_lmax(6, Some(1)), None);
}

#[test]
fn test_alm_index_is_mmax_independent() {
    let lmax = 6;
    let degrees = alm_degrees(lmax, lmax);
    assert_eq!(degrees.len(), alm_size(lmax, lmax));
    for m in 0..=lmax {
        for l in m..=lmax {
            assert_eq!(degrees[alm_index(lmax, l, m)], l);
        }
    }
    // A truncated array is a prefix of the full one.
    assert_eq!(&degrees[..alm_size(lmax, 2)], &alm_degrees(lmax, 2)[..]);
}

#[test]
fn test_alm_size_overflow() {
    assert_eq!(checked_alm_size(700, 700), Some(246051));
    assert_eq!(checked_alm_size(3, 1), Some(7));
    assert_eq!(checked_alm_size(usize::MAX / 2, usize::MAX / 2), None);
    assert_eq!(checked_alm_size(usize::MAX, 0), None);
    assert_eq!(alm_size(usize::MAX / 2, usize::MAX / 2), usize::MAX);

    assert!(matches!(
        HealpixBlmTools.gauss_blm(1e-6, 30_240_000_000),
        Err(BlmError::TooLarge {
            lmax: 30_240_000_000,
            ..
        })
    ));
    // Fits in a usize, but not in memory.
    assert!(matches!(
        HealpixBlmTools.gauss_blm(1e-6, 1 << 31),
        Err(BlmError::TooLarge { .. })
    ));
}

#[test]
fn test_gauss_blm_monopole() {
    let blm = HealpixBlmTools.gauss_blm(43.0, 50).unwrap();
    assert_eq!(blm.len(), alm_size(50, 50));
    assert_abs_diff_eq!(blm[0].re, 1.0 / (4.0 * PI).sqrt(), epsilon = 1e-14);
    assert_abs_diff_eq!(blm[0].im, 0.0);
    // Only m = 0 is populated.
    assert!(blm.iter().skip(51).all(|b| *b == c64::default()));
    // A Gaussian falls off with l once sqrt(2l+1) is accounted for.
    let b10 = blm[10].re / (21.0 / (4.0 * PI)).sqrt();
    let b20 = blm[20].re / (41.0 / (4.0 * PI)).sqrt();
    assert!(b10 > b20);
}

#[test]
fn test_copol_blm_symmetric_beam() {
    let lmax = 8;
    let blm = HealpixBlmTools.gauss_blm(600.0, lmax).unwrap();
    let triplet = HealpixBlmTools
        .copol_blm(blm.clone(), &CopolOptions::default())
        .unwrap();
    assert_eq!(triplet.co, blm);

    // A symmetric beam only has m = 0, so spin -2 is empty and spin +2 only
    // has m = 2 (for l >= 2).
    assert!(triplet.minus2.iter().all(|b| *b == c64::default()));
    for m in 0..=lmax {
        for l in m..=lmax {
            let b = triplet.plus2[alm_index(lmax, l, m)];
            if m == 2 {
                assert_abs_diff_eq!(b, blm[alm_index(lmax, l, 0)]);
            } else {
                assert_eq!(b, c64::default());
            }
        }
    }
}

#[test]
fn test_copol_blm_c2_fwhm_boosts_spin_components() {
    let lmax = 8;
    let blm = HealpixBlmTools.gauss_blm(600.0, lmax).unwrap();
    let triplet = HealpixBlmTools
        .copol_blm(
            blm.clone(),
            &CopolOptions {
                c2_fwhm: Some(600.0),
                ..Default::default()
            },
        )
        .unwrap();
    let i = alm_index(lmax, 4, 2);
    assert!(triplet.plus2[i].re > blm[alm_index(lmax, 4, 0)].re);
}

#[test]
fn test_copol_blm_negative_orders() {
    let lmax = 3;
    let mut blm = Array1::zeros(alm_size(lmax, lmax));
    blm[alm_index(lmax, 3, 1)] = c64::new(1.0, 2.0);
    let triplet = HealpixBlmTools
        .copol_blm(blm, &CopolOptions::default())
        .unwrap();

    // +2 b_3,1 = b_3,-1 = -conj(b_3,1)
    assert_abs_diff_eq!(
        triplet.plus2[alm_index(lmax, 3, 1)],
        c64::new(-1.0, 2.0)
    );
    // +2 b_3,3 = b_3,1
    assert_abs_diff_eq!(triplet.plus2[alm_index(lmax, 3, 3)], c64::new(1.0, 2.0));
    // There's no m = 3 coefficient, so -2 b_3,1 is zero.
    assert_eq!(triplet.minus2[alm_index(lmax, 3, 1)], c64::default());
}

#[test]
fn test_copol_blm_rejects_bad_sizes() {
    let result = HealpixBlmTools.copol_blm(Array1::zeros(4), &CopolOptions::default());
    assert!(matches!(result, Err(BlmError::BadSize { size: 4, .. })));
}

#[test]
fn test_scale_blm_deconv_and_normalize() {
    let lmax = 4;
    let blm = HealpixBlmTools.gauss_blm(300.0, lmax).unwrap();
    let triplet = BlmTriplet::new(blm.clone(), blm.clone() * 2.0, blm.clone() * 3.0);

    let deconvolved = HealpixBlmTools
        .scale_blm(
            triplet.clone(),
            &ScaleOptions {
                deconv_q: true,
                normalize: false,
            },
        )
        .unwrap();
    // b_00 * sqrt(4 pi) = 1.
    assert_abs_diff_eq!(deconvolved.co[0].re, 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(deconvolved.minus2[0].re, 2.0, epsilon = 1e-14);

    let normalised = HealpixBlmTools
        .scale_blm(
            triplet,
            &ScaleOptions {
                deconv_q: false,
                normalize: true,
            },
        )
        .unwrap();
    assert_abs_diff_eq!(normalised.co[0], c64::new(1.0, 0.0), epsilon = 1e-14);
    assert_abs_diff_eq!(normalised.plus2[0], c64::new(3.0, 0.0), epsilon = 1e-14);
}

#[test]
fn test_scale_blm_zero_monopole() {
    let zeros: Array1<c64> = Array1::zeros(alm_size(2, 2));
    let triplet = BlmTriplet::new(zeros.clone(), zeros.clone(), zeros);
    let result = HealpixBlmTools.scale_blm(
        triplet,
        &ScaleOptions {
            deconv_q: false,
            normalize: true,
        },
    );
    assert!(matches!(result, Err(BlmError::ZeroMonopole)));
}

#[test]
fn test_triplet_lmax_checks_lengths() {
    let triplet = BlmTriplet::new(
        Array1::zeros(alm_size(3, 3)),
        Array1::zeros(alm_size(3, 3)),
        Array1::zeros(alm_size(2, 2)),
    );
    assert!(matches!(
        triplet.lmax(),
        Err(BlmError::TripletLengths { .. })
    ));
}

#[test]
fn test_shared_triplets_alias() {
    let triplet = BlmTriplet::new(
        Array1::zeros(alm_size(1, 1)),
        Array1::zeros(alm_size(1, 1)),
        Array1::zeros(alm_size(1, 1)),
    );
    let a = triplet.into_shared();
    let b = std::rc::Rc::clone(&a);
    a.borrow_mut().co[0] = c64::new(5.0, 0.0);
    assert_eq!(b.borrow().co[0], c64::new(5.0, 0.0));
}
