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

use crate::weight::interface::Gain;
use embassy_time::Duration;

/// Conversions run at 10 or 80 SPS, and the first one after power up takes around 400ms, so a
/// second is comfortably longer than any healthy wait.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_READY_POLL_INTERVAL_US: u32 = 200;
/// Datasheet allows 0.2us to 50us per clock phase.
pub const DEFAULT_CLOCK_HALF_PERIOD_NS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hx711Config {
    pub gain: Gain,
    /// Order of the three data bytes within a frame
    pub byte_order: BitOrder,
    /// Order of the bits within each byte
    pub bit_order: BitOrder,
    /// Upper bound on the wait for the converter to pull the data line low. `None` waits
    /// forever.
    pub ready_timeout: Option<Duration>,
    pub ready_poll_interval_us: u32,
    /// Time the clock is held in each phase of a pulse. Zero skips the delay entirely, which
    /// is what you want where the delay provider sleeps with coarse granularity - a stretched
    /// high phase past 60us powers the converter down mid-frame.
    pub clock_half_period_ns: u32,
}

impl Default for Hx711Config {
    fn default() -> Self {
        Self {
            gain: Gain::Gain128,
            byte_order: BitOrder::MsbFirst,
            bit_order: BitOrder::MsbFirst,
            ready_timeout: Some(DEFAULT_READY_TIMEOUT),
            ready_poll_interval_us: DEFAULT_READY_POLL_INTERVAL_US,
            clock_half_period_ns: DEFAULT_CLOCK_HALF_PERIOD_NS,
        }
    }
}

impl Hx711Config {
    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_reading_format(mut self, byte_order: BitOrder, bit_order: BitOrder) -> Self {
        self.byte_order = byte_order;
        self.bit_order = bit_order;
        self
    }

    pub fn with_ready_timeout(mut self, ready_timeout: Option<Duration>) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    pub fn with_ready_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.ready_poll_interval_us = interval_us;
        self
    }

    pub fn with_clock_half_period_ns(mut self, half_period_ns: u32) -> Self {
        self.clock_half_period_ns = half_period_ns;
        self
    }
}
