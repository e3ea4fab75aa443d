// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

//! Noise filtering over batches of raw samples. Slices are sorted in place.

use crate::error::{Error, Result};

/// Below this many samples trimming would throw away most of the data, so the median is used.
pub const MIN_TRIMMED_SAMPLES: usize = 5;

/// Samples dropped from each end: floor(20% of the batch).
pub fn trim_count(sample_count: usize) -> usize {
    sample_count / 5
}

/// Middle sample, or the mean of the two middle samples for an even count.
pub fn median(samples: &mut [i32]) -> Result<f64> {
    if samples.is_empty() {
        return Err(Error::InvalidArgument("sample count must be at least 1"));
    }
    samples.sort_unstable();

    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Ok(samples[mid] as f64)
    } else {
        Ok(mean(&samples[mid - 1..=mid]))
    }
}

/// Mean after discarding the lowest and highest 20%. Falls back to [`median`] for fewer than
/// [`MIN_TRIMMED_SAMPLES`] samples.
pub fn trimmed_mean(samples: &mut [i32]) -> Result<f64> {
    if samples.len() < MIN_TRIMMED_SAMPLES {
        return median(samples);
    }
    samples.sort_unstable();

    let trim = trim_count(samples.len());
    Ok(mean(&samples[trim..samples.len() - trim]))
}

fn mean(samples: &[i32]) -> f64 {
    let sum: i64 = samples.iter().map(|s| *s as i64).sum();
    sum as f64 / samples.len() as f64
}
