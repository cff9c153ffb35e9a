// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
};

use approx::assert_abs_diff_eq;
use indoc::formatdoc;
use ndarray::prelude::*;
use tempfile::TempDir;

use detector_beams::{
    blm::alm_size,
    c64,
    config::{read_beam, read_focal_plane},
    io::{alm, npy},
    BeamType, PI,
};

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(filename: T, dir: U) -> (PathBuf, File) {
    let path = dir.as_ref().join(filename);
    let f = File::create(&path).expect("couldn't make file");
    (path, f)
}

/// A co-polar beam that's easy to recognise: b_00 = 2, everything else small.
fn fake_copolar(lmax: usize) -> Array1<c64> {
    let mut blm = Array1::from_elem(alm_size(lmax, lmax), c64::new(0.01, -0.01));
    blm[0] = c64::new(2.0, 0.0);
    blm
}

#[test]
fn test_focal_plane_from_toml_with_files() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let lmax = 8;
    let co = fake_copolar(lmax);
    let minus2 = co.mapv(|b| b * 0.5);
    let plus2 = co.mapv(|b| b * 0.25);
    alm::write(
        tmp_dir.path().join("det0_po.fits"),
        &[co.view(), minus2.view(), plus2.view()],
        Some(4),
    )
    .unwrap();
    npy::write_blm(tmp_dir.path().join("det1_eg.npy"), co.view()).unwrap();

    let (config, mut f) = make_file_in_dir("focal_plane.toml", tmp_dir.path());
    let contents = formatdoc! {r#"
        [[beams]]
        name = "det0"
        btype = "PO"
        po_file = "{po}"
        lmax = {lmax}
        amplitude = 3.0
        deconv_q = false

        [[beams.ghosts]]
        tag = "refl"
        amplitude = 0.01
        btype = "Gaussian"
        fwhm = 120.0

        [[beams]]
        name = "det1"
        pol = "B"
        btype = "EG"
        eg_file = "{eg}"
        lmax = {lmax}
        deconv_q = false
        normalize = false

        [[beams.ghosts]]
        tag = "refl"
    "#,
        po = tmp_dir.path().join("det0_po").display(),
        eg = tmp_dir.path().join("det1_eg.npy").display(),
    };
    f.write_all(contents.as_bytes()).unwrap();
    drop(f);

    let mut beams = read_focal_plane(&config).unwrap().build().unwrap();
    assert_eq!(beams.len(), 2);

    // det0: three channels in FITS with mmax = 4. Normalised, then scaled.
    let det0 = &mut beams[0];
    assert_eq!(det0.mmax(), lmax);
    let blm = det0.blm().unwrap();
    assert_eq!(det0.mmax(), 4);
    {
        let blm = blm.borrow();
        assert_abs_diff_eq!(blm.co[0], c64::new(3.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(blm.minus2[0], c64::new(1.5, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(blm.plus2[0], c64::new(0.75, 0.0), epsilon = 1e-12);
        // Orders above the file's mmax are zero.
        assert_eq!(blm.co[blm.co.len() - 1], c64::default());
    }

    // The ghost is a Gaussian with its own width.
    let ghost = &mut det0.ghosts_mut()[0];
    assert_eq!(ghost.name.as_deref(), Some("det0_refl"));
    assert_eq!(ghost.btype, BeamType::Gaussian);
    assert_eq!(ghost.lmax(), lmax);
    let ghost_blm = ghost.blm().unwrap();
    assert_abs_diff_eq!(
        ghost_blm.borrow().co[0].re,
        0.01 / (4.0 * PI).sqrt(),
        epsilon = 1e-12
    );

    // det1: a co-polar dense file; the spin-2 parts are derived.
    let det1 = &mut beams[1];
    assert_eq!(det1.pol, "B");
    let blm = det1.blm().unwrap();
    assert_eq!(det1.mmax(), lmax);
    assert_abs_diff_eq!(blm.borrow().co, co, epsilon = 1e-14);
    assert_eq!(blm.borrow().minus2[0], c64::default());

    // Share det0's ghost coefficients with det1's ghost.
    let (first, second) = beams.split_at_mut(1);
    let partner = &mut first[0].ghosts_mut()[0];
    let ghost = &mut second[0].ghosts_mut()[0];
    ghost.reuse_blm(partner).unwrap();
    assert!(Rc::ptr_eq(&ghost.blm().unwrap(), &partner.blm().unwrap()));
    assert_eq!(ghost.btype, BeamType::Gaussian);
    assert_eq!(ghost.ghost_idx(), partner.ghost_idx());

    // Killing a detector kills its ghosts.
    first[0].set_dead(true);
    assert!(first[0].ghosts()[0].dead());
    assert!(!second[0].ghosts()[0].dead());
}

#[test]
fn test_beam_from_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let (config, mut f) = make_file_in_dir("beam.json", tmp_dir.path());
    f.write_all(br#"{"name": "solo", "fwhm": 43.0, "amplitude": 2.0, "ghosts": [{"tag": ""}]}"#)
        .unwrap();
    drop(f);

    let mut beam = read_beam(&config).unwrap();
    assert_eq!(beam.lmax(), 703);
    assert_eq!(beam.ghosts()[0].name.as_deref(), Some("solo"));
    let blm = beam.blm().unwrap();
    assert_abs_diff_eq!(
        blm.borrow().co[0].re,
        2.0 / (4.0 * PI).sqrt(),
        epsilon = 1e-12
    );

    beam.delete_blm(true);
    assert!(!beam.has_blm());
    let again = beam.blm().unwrap();
    assert_abs_diff_eq!(again.borrow().co, blm.borrow().co, epsilon = 1e-14);
}
