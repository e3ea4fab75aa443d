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

use crate::error::{Error, Result};
use crate::weight::Channel;

/// Zero point and sensitivity of one converter channel.
///
/// `reference_unit` is ADC counts per unit of weight and is never zero, NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCalibration {
    offset: f64,
    reference_unit: f64,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self {
            offset: 0.0,
            reference_unit: 1.0,
        }
    }
}

impl ChannelCalibration {
    pub fn new(offset: f64, reference_unit: f64) -> Result<Self> {
        let mut calibration = Self::default();
        calibration.set_offset(offset)?;
        calibration.set_reference_unit(reference_unit)?;
        Ok(calibration)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn reference_unit(&self) -> f64 {
        self.reference_unit
    }

    pub fn set_offset(&mut self, offset: f64) -> Result<()> {
        if !offset.is_finite() {
            return Err(Error::InvalidArgument("offset must be finite"));
        }
        self.offset = offset;
        Ok(())
    }

    pub fn set_reference_unit(&mut self, reference_unit: f64) -> Result<()> {
        if reference_unit == 0.0 || !reference_unit.is_finite() {
            return Err(Error::InvalidArgument("reference unit must be finite and non-zero"));
        }
        self.reference_unit = reference_unit;
        Ok(())
    }

    /// Reading relative to the tare point, still in ADC counts.
    pub fn value(&self, reading: f64) -> f64 {
        reading - self.offset
    }

    pub fn weight(&self, reading: f64) -> f64 {
        self.value(reading) / self.reference_unit
    }
}

/// Calibration for both channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStore {
    channels: [ChannelCalibration; 2],
}

impl CalibrationStore {
    pub fn new(channel_a: ChannelCalibration, channel_b: ChannelCalibration) -> Self {
        Self {
            channels: [channel_a, channel_b],
        }
    }

    pub fn channel(&self, channel: Channel) -> &ChannelCalibration {
        &self.channels[channel.index()]
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelCalibration {
        &mut self.channels[channel.index()]
    }
}
