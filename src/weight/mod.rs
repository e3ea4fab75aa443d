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

pub mod calibration;
pub mod interface;
pub mod shared;
pub mod statistics;
#[allow(clippy::module_inception)]
pub mod weight;

use crate::error::Result;

/// Samples averaged (trimmed mean) when taring.
pub const DEFAULT_TARE_SAMPLES: usize = 15;
/// Samples taken (median) per weight reading.
pub const DEFAULT_WEIGHT_SAMPLES: usize = 3;
/// Upper bound on samples per aggregated reading.
pub const MAX_SAMPLES: usize = 64;

/// Physical input of the converter. Channel B is only reachable at gain 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    #[default]
    A,
    B,
}

impl Channel {
    pub(crate) fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }
}

/// The narrow surface the rest of an application needs from a scale: zero it, calibrate it
/// against a known mass and read weight. Works on channel A with the default sample counts.
pub trait WeighingSystem {
    /// Record the current (unloaded) reading as zero. Returns the stored offset.
    fn tare(&mut self) -> Result<f64>;

    /// With `calibration_mass` on the tared scale, derive and store the reference unit.
    fn calibrate(&mut self, calibration_mass: f64) -> Result<()>;

    fn get_weight(&mut self) -> Result<f64>;
}
