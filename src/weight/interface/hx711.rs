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

use crate::config::{BitOrder, Hx711Config};
use crate::error::{Error, Result};
use crate::weight::interface::line_map::{LineMap, LineProvider, DEFAULT_CONSUMER};
use crate::weight::interface::{Gain, PowerState, StrainGaugeInterface};
use embassy_time::Instant;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, trace, warn};

/// Clock held high at least 60us puts the converter to sleep; holding low as long wakes it.
const POWER_MODE_CHANGE_DELAY_US: u32 = 100;
const FRAME_BYTES: usize = 3;
const SIGN_BIT: u32 = 0x80_0000;
const MAGNITUDE_MASK: u32 = 0x7F_FFFF;

/// Sign extend a 24-bit two's complement code.
pub fn decode_twos_complement_24(value: u32) -> i32 {
    (value & MAGNITUDE_MASK) as i32 - (value & SIGN_BIT) as i32
}

/// Bit-banged HX711.
///
/// Every frame is 24 data bits followed by 1-3 pulses selecting the gain of the *next*
/// conversion, so a gain change only takes effect after one more frame has been clocked out.
/// [`StrainGaugeInterface::set_gain`] and [`StrainGaugeInterface::power_up`] do that
/// throwaway read themselves; after they return the selected gain is live.
///
/// Frames must run to completion once started, and nothing in here may stretch a clock high
/// phase past 60us or the converter powers down mid-transfer.
pub struct Hx711<CLK, DATA, D> {
    clock_pin: CLK,
    data_pin: DATA,
    delay: D,
    config: Hx711Config,
    gain: Gain,
    power_state: PowerState,
    last_raw_value: i32,
}

impl<CLK, DATA, D> Hx711<CLK, DATA, D>
where
    CLK: OutputPin,
    DATA: InputPin,
    D: DelayNs,
{
    /// Wrap already configured lines. Nothing is driven until the first operation, and the
    /// configured gain is only latched by [`StrainGaugeInterface::initialize`] or
    /// [`StrainGaugeInterface::set_gain`].
    pub fn new(clock_pin: CLK, data_pin: DATA, delay: D, config: Hx711Config) -> Self {
        Self {
            clock_pin,
            data_pin,
            delay,
            gain: config.gain,
            config,
            power_state: PowerState::Active,
            last_raw_value: 0,
        }
    }

    /// Claim the data and clock lines for the given header pins and latch the configured gain.
    pub fn from_line_map<P>(
        provider: &mut P,
        line_map: &LineMap<'_>,
        data_pin: u8,
        clock_pin: u8,
        delay: D,
        config: Hx711Config,
    ) -> Result<Self>
    where
        P: LineProvider<Output = CLK, Input = DATA>,
    {
        let data_line = line_map.line_number(data_pin)?;
        let clock_line = line_map.line_number(clock_pin)?;

        let clock = provider
            .request_output(clock_line, DEFAULT_CONSUMER)
            .map_err(|e| {
                warn!("Unable to claim clock line {}: {:?}", clock_line, e);
                Error::LineUnavailable { line: clock_line }
            })?;
        let data = provider
            .request_input(data_line, DEFAULT_CONSUMER)
            .map_err(|e| {
                warn!("Unable to claim data line {}: {:?}", data_line, e);
                Error::LineUnavailable { line: data_line }
            })?;
        debug!("Claimed clock line {} and data line {}", clock_line, data_line);

        let mut hx711 = Self::new(clock, data, delay, config);
        hx711.set_gain(config.gain)?;
        Ok(hx711)
    }

    /// Give the lines and delay back to the caller. Dropping the pins releases the lines.
    pub fn release(self) -> (CLK, DATA, D) {
        (self.clock_pin, self.data_pin, self.delay)
    }

    pub fn config(&self) -> &Hx711Config {
        &self.config
    }

    pub fn set_reading_format(&mut self, byte_order: BitOrder, bit_order: BitOrder) {
        self.config.byte_order = byte_order;
        self.config.bit_order = bit_order;
    }

    /// Most recent decoded sample, including throwaway reads.
    pub fn last_raw_value(&self) -> i32 {
        self.last_raw_value
    }

    /// The converter pulls the data line low while a conversion is waiting to be read.
    pub fn is_ready(&mut self) -> Result<bool> {
        self.data_pin.is_low().map_err(Error::from_pin)
    }

    /// One clock pulse; the data line is sampled after the falling edge.
    pub fn read_bit(&mut self) -> Result<bool> {
        self.clock_pin.set_high().map_err(Error::from_pin)?;
        self.clock_phase_delay();
        self.clock_pin.set_low().map_err(Error::from_pin)?;
        let bit = self.data_pin.is_high().map_err(Error::from_pin)?;
        self.clock_phase_delay();
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0u8;
        for _ in 0..8 {
            let bit = self.read_bit()? as u8;
            byte = match self.config.bit_order {
                BitOrder::MsbFirst => (byte << 1) | bit,
                BitOrder::LsbFirst => (byte >> 1) | (bit << 7),
            };
        }
        Ok(byte)
    }

    /// Clock out one frame and return its bytes, most significant first.
    pub fn read_raw_bytes(&mut self) -> Result<[u8; FRAME_BYTES]> {
        if self.power_state == PowerState::PoweredDown {
            self.power_up()?;
        }
        self.wait_ready()?;

        let mut bytes = [0u8; FRAME_BYTES];
        for byte in bytes.iter_mut() {
            *byte = self.read_byte()?;
        }

        for _ in 0..self.gain.pulse_count() {
            self.pulse_clock()?;
        }

        if self.config.byte_order == BitOrder::LsbFirst {
            bytes.reverse();
        }
        Ok(bytes)
    }

    /// Clock out one frame and decode it.
    pub fn read_raw_frame(&mut self) -> Result<i32> {
        let bytes = self.read_raw_bytes()?;
        let code = (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32;
        let value = decode_twos_complement_24(code);
        trace!("Raw frame {:02x?} = 0x{:06x} = {}", bytes, code, value);
        self.last_raw_value = value;
        Ok(value)
    }

    fn wait_ready(&mut self) -> Result<()> {
        let deadline = self
            .config
            .ready_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        loop {
            if self.is_ready()? {
                return Ok(());
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!("HX711 not ready after {:?}", self.config.ready_timeout);
                    return Err(Error::DeviceNotResponding);
                }
            }
            self.delay.delay_us(self.config.ready_poll_interval_us);
        }
    }

    fn pulse_clock(&mut self) -> Result<()> {
        self.clock_pin.set_high().map_err(Error::from_pin)?;
        self.clock_phase_delay();
        self.clock_pin.set_low().map_err(Error::from_pin)?;
        self.clock_phase_delay();
        Ok(())
    }

    fn clock_phase_delay(&mut self) {
        if self.config.clock_half_period_ns > 0 {
            self.delay.delay_ns(self.config.clock_half_period_ns);
        }
    }
}

impl<CLK, DATA, D> StrainGaugeInterface for Hx711<CLK, DATA, D>
where
    CLK: OutputPin,
    DATA: InputPin,
    D: DelayNs,
{
    fn initialize(&mut self) -> Result<()> {
        self.reset()
    }

    fn get_next_reading(&mut self) -> Result<i32> {
        self.read_raw_frame()
    }

    fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.gain = gain;
        self.clock_pin.set_low().map_err(Error::from_pin)?;
        self.read_raw_frame()?;
        debug!("Gain set to {}", gain.factor());
        Ok(())
    }

    fn gain(&self) -> Gain {
        self.gain
    }

    fn power_down(&mut self) -> Result<()> {
        self.clock_pin.set_low().map_err(Error::from_pin)?;
        self.clock_pin.set_high().map_err(Error::from_pin)?;
        self.delay.delay_us(POWER_MODE_CHANGE_DELAY_US);
        self.power_state = PowerState::PoweredDown;
        debug!("HX711 powered down");
        Ok(())
    }

    fn power_up(&mut self) -> Result<()> {
        self.clock_pin.set_low().map_err(Error::from_pin)?;
        self.delay.delay_us(POWER_MODE_CHANGE_DELAY_US);
        self.power_state = PowerState::Active;
        debug!("HX711 powered up");

        // Wakes at gain 128; anything else needs a frame to latch again
        if self.gain != Gain::Gain128 {
            self.read_raw_frame()?;
        }
        Ok(())
    }

    fn power_state(&self) -> PowerState {
        self.power_state
    }
}
