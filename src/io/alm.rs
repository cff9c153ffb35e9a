// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! blm stored in FITS files, in the layout written by `healpy.write_alm`.
//!
//! Each polarisation channel occupies its own binary-table HDU (co-polar,
//! then spin -2, then spin +2) with columns `INDEX`, `REAL` and `IMAG`, where
//! `INDEX = l^2 + l + m + 1`. Only coefficients with `m <= mmax` are present,
//! and `mmax` may be smaller than `lmax`.

use std::path::Path;

use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use log::{debug, trace};
use ndarray::prelude::*;

use super::{
    fits::{fits_get_col, fits_get_num_hdus, fits_get_optional_key, fits_open, fits_open_hdu},
    BlmData, BlmReadError, BlmWriteError, LoadedBlm,
};
use crate::{
    blm::{alm_index, alm_lmax, alm_size, BlmTriplet},
    c64,
    constants::{FITS_KEY_LMAX, FITS_KEY_MMAX},
};

/// The coefficients of a single alm HDU.
#[derive(Debug)]
struct AlmHdu {
    /// (l, m, coefficient)
    entries: Vec<(usize, usize, c64)>,
    lmax: usize,
    mmax: Option<usize>,
}

impl AlmHdu {
    /// Expand into a full (`mmax = lmax`) array. Coefficients that weren't in
    /// the file are zero.
    fn to_dense(&self, lmax: usize) -> Array1<c64> {
        let mut alm = Array1::zeros(alm_size(lmax, lmax));
        for &(l, m, value) in &self.entries {
            alm[alm_index(lmax, l, m)] = value;
        }
        alm
    }
}

/// Split a healpy alm index into (l, m).
fn index_to_lm(index: i64) -> Option<(usize, usize)> {
    let i = usize::try_from(index.checked_sub(1)?).ok()?;
    let mut l = (i as f64).sqrt() as usize;
    // Guard against floating-point error in the square root.
    while l * l > i {
        l -= 1;
    }
    while (l + 1) * (l + 1) <= i {
        l += 1;
    }
    // i = l^2 + l + m, and m may not be negative.
    let m = i.checked_sub(l * l + l)?;
    Some((l, m))
}

fn read_hdu(fptr: &mut FitsFile, hdu_num: usize) -> Result<AlmHdu, BlmReadError> {
    let file = fptr.file_path().display().to_string();
    let hdu = fits_open_hdu(fptr, hdu_num)?;
    let index: Vec<i64> = fits_get_col(fptr, &hdu, "INDEX")?;
    let real: Vec<f64> = fits_get_col(fptr, &hdu, "REAL")?;
    let imag: Vec<f64> = fits_get_col(fptr, &hdu, "IMAG")?;
    if index.len() != real.len() || index.len() != imag.len() {
        return Err(BlmReadError::ColumnLengths {
            file,
            hdu_num,
            index: index.len(),
            real: real.len(),
            imag: imag.len(),
        });
    }

    let entries = index
        .iter()
        .zip(real)
        .zip(imag)
        .map(|((&index, re), im)| {
            index_to_lm(index)
                .map(|(l, m)| (l, m, c64::new(re, im)))
                .ok_or_else(|| BlmReadError::BadIndex {
                    file: file.clone(),
                    hdu_num,
                    index,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let lmax = entries.iter().map(|&(l, _, _)| l).max().unwrap_or(0);
    let data_mmax = entries.iter().map(|&(_, m, _)| m).max();
    // healpy records the azimuthal band-limit in the header; fall back to the
    // largest order present.
    let header_mmax: Option<usize> = fits_get_optional_key(fptr, &hdu, FITS_KEY_MMAX)?;
    let mmax = match (header_mmax, data_mmax) {
        (Some(h), Some(d)) => Some(h.max(d).min(lmax)),
        (Some(h), None) => Some(h),
        (None, d) => d,
    };
    trace!(
        "{file} HDU {hdu_num}: {} coefficients, lmax {lmax}, mmax {mmax:?}",
        entries.len()
    );

    Ok(AlmHdu {
        entries,
        lmax,
        mmax,
    })
}

pub(super) fn read(file: &Path) -> Result<LoadedBlm, BlmReadError> {
    let mut fptr = fits_open(file)?;
    // The primary HDU doesn't hold alms.
    let num_channels = fits_get_num_hdus(&mut fptr)?.saturating_sub(1);
    if num_channels == 0 {
        return Err(BlmReadError::NoAlmHdus {
            file: file.display().to_string(),
        });
    }

    let co = read_hdu(&mut fptr, 1)?;
    if num_channels < 3 {
        debug!("{}: read co-polar alm only", file.display());
        return Ok(LoadedBlm {
            data: BlmData::CoPolar(co.to_dense(co.lmax)),
            mmax: co.mmax,
        });
    }

    let m2 = read_hdu(&mut fptr, 2)?;
    let p2 = read_hdu(&mut fptr, 3)?;
    if co.mmax != m2.mmax || m2.mmax != p2.mmax {
        return Err(BlmReadError::MmaxMismatch {
            file: file.display().to_string(),
            mmax: co.mmax,
            mmax_m2: m2.mmax,
            mmax_p2: p2.mmax,
        });
    }

    // Expand all channels to the same length.
    let lmax = co.lmax.max(m2.lmax).max(p2.lmax);
    debug!(
        "{}: read co-polar and spin +-2 alm (lmax {lmax}, mmax {:?})",
        file.display(),
        co.mmax
    );
    Ok(LoadedBlm {
        data: BlmData::Triplet(BlmTriplet::new(
            co.to_dense(lmax),
            m2.to_dense(lmax),
            p2.to_dense(lmax),
        )),
        mmax: co.mmax,
    })
}

/// Write alm channels to a new FITS file, one binary-table HDU per channel, in
/// the layout used by `healpy.write_alm`. Each channel must be a full
/// (`mmax = lmax`) array; only orders up to `mmax` are written. An existing
/// file is overwritten.
pub fn write<P: AsRef<Path>>(
    file: P,
    channels: &[ArrayView1<c64>],
    mmax: Option<usize>,
) -> Result<(), BlmWriteError> {
    let channels: Vec<_> = channels.iter().map(|c| (c.view(), mmax)).collect();
    write_channels(file.as_ref(), &channels)
}

/// As [`write`], but each channel carries its own `mmax`.
pub(crate) fn write_channels(
    file: &Path,
    channels: &[(ArrayView1<c64>, Option<usize>)],
) -> Result<(), BlmWriteError> {
    if file.exists() {
        std::fs::remove_file(file)?;
    }
    let mut fptr = FitsFile::create(file).open()?;

    for (channel, mmax) in channels {
        let lmax = alm_lmax(channel.len(), None).ok_or(BlmWriteError::BadLength {
            actual: channel.len(),
        })?;
        let mmax = mmax.unwrap_or(lmax);
        if mmax > lmax {
            return Err(BlmWriteError::MmaxTooLarge { lmax, mmax });
        }

        let mut index = Vec::with_capacity(alm_size(lmax, mmax));
        let mut real = Vec::with_capacity(index.capacity());
        let mut imag = Vec::with_capacity(index.capacity());
        for m in 0..=mmax {
            for l in m..=lmax {
                let value = channel[alm_index(lmax, l, m)];
                index.push((l * l + l + m + 1) as i32);
                real.push(value.re);
                imag.push(value.im);
            }
        }

        let index_col = ColumnDescription::new("INDEX")
            .with_type(ColumnDataType::Int)
            .create()?;
        let real_col = ColumnDescription::new("REAL")
            .with_type(ColumnDataType::Double)
            .create()?;
        let imag_col = ColumnDescription::new("IMAG")
            .with_type(ColumnDataType::Double)
            .create()?;
        let hdu = fptr.create_table("ALM", &[index_col, real_col, imag_col])?;
        hdu.write_col(&mut fptr, "INDEX", &index)?;
        hdu.write_col(&mut fptr, "REAL", &real)?;
        hdu.write_col(&mut fptr, "IMAG", &imag)?;
        hdu.write_key(&mut fptr, FITS_KEY_LMAX, lmax as i64)?;
        hdu.write_key(&mut fptr, FITS_KEY_MMAX, mmax as i64)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_to_lm() {
        assert_eq!(index_to_lm(1), Some((0, 0)));
        // l = 1, m = -1
        assert_eq!(index_to_lm(2), None);
        assert_eq!(index_to_lm(3), Some((1, 0)));
        assert_eq!(index_to_lm(4), Some((1, 1)));
        assert_eq!(index_to_lm(7), Some((2, 0)));
        assert_eq!(index_to_lm(9), Some((2, 2)));
        assert_eq!(index_to_lm(0), None);
        assert_eq!(index_to_lm(-3), None);

        for lmax in [3, 10] {
            for m in 0..=lmax {
                for l in m..=lmax {
                    let index = (l * l + l + m + 1) as i64;
                    assert_eq!(index_to_lm(index), Some((l, m)));
                }
            }
        }
    }
}
