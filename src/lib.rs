#![no_std]
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

//! Front end for an HX711 load-cell amplifier.
//!
//! The converter is bit-banged over two lines: a clock output and a data input. Samples are
//! filtered (median or trimmed mean) and turned into weight using a per-channel tare offset and
//! reference unit (ADC counts per unit of weight).
//!
//! The pieces, bottom up:
//! - [`Hx711`] clocks frames out of the converter, latches gain/channel and drives power down.
//! - [`WeightScale`] aggregates samples and owns the calibration for channels A and B.
//! - [`SharedWeightScale`] serialises every operation behind an `embassy_sync` mutex.
//!
//! Time is taken from `embassy_time`, so the final binary must provide a time driver
//! (`embassy-time/std` on a host, the HAL's driver on a microcontroller).

#[cfg(test)]
extern crate std;

pub mod config;
pub mod error;
pub mod weight;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{BitOrder, Hx711Config};
pub use error::{Error, Result};
pub use weight::calibration::{CalibrationStore, ChannelCalibration};
pub use weight::interface::hx711::{decode_twos_complement_24, Hx711};
pub use weight::interface::line_map::{LineMap, LineProvider, DEFAULT_CONSUMER};
pub use weight::interface::{Gain, PowerState, StrainGaugeInterface};
pub use weight::shared::SharedWeightScale;
pub use weight::weight::WeightScale;
pub use weight::{Channel, WeighingSystem, DEFAULT_TARE_SAMPLES, DEFAULT_WEIGHT_SAMPLES, MAX_SAMPLES};
