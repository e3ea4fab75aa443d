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

pub mod hx711;
pub mod line_map;

use crate::error::{Error, Result};

/// Amplifier gain. Also selects the input: 128 and 64 sample channel A, 32 samples channel B.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::FromRepr, strum::EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    #[default]
    Gain128 = 128,
    Gain64 = 64,
    Gain32 = 32,
}

impl Gain {
    /// Clock pulses sent after the 24 data bits to select this gain for the next conversion.
    pub fn pulse_count(&self) -> usize {
        match self {
            Gain::Gain128 => 1,
            Gain::Gain64 => 3,
            Gain::Gain32 => 2,
        }
    }

    pub fn factor(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Gain {
    type Error = Error;

    fn try_from(factor: u8) -> Result<Self> {
        Gain::from_repr(factor).ok_or(Error::InvalidArgument("gain must be 128, 64 or 32"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Active,
    PoweredDown,
}

pub trait StrainGaugeInterface {
    /// Run the reset sequence (power down then up) and leave the gauge ready for readings at
    /// the configured gain.
    fn initialize(&mut self) -> Result<()>;

    /// Gets next reading from the strain gauge. If the gauge is powered down then
    /// this function is expected to power up the device and get the reading.
    fn get_next_reading(&mut self) -> Result<i32>;

    /// Select a new gain. Once this returns the gain is latched: the next reading is taken
    /// with it.
    fn set_gain(&mut self, gain: Gain) -> Result<()>;

    fn gain(&self) -> Gain;

    fn power_down(&mut self) -> Result<()>;

    /// Wake the gauge. Any non-default gain is re-latched before returning.
    fn power_up(&mut self) -> Result<()>;

    fn power_state(&self) -> PowerState;

    /// Power down immediately followed by power up.
    fn reset(&mut self) -> Result<()> {
        self.power_down()?;
        self.power_up()
    }
}
