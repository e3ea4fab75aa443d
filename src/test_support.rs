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

//! Host-side stand-ins for the converter and its lines.

use crate::config::Hx711Config;
use crate::error::{Error, Result};
use crate::weight::interface::hx711::Hx711;
use crate::weight::interface::line_map::LineProvider;
use crate::weight::interface::{Gain, PowerState, StrainGaugeInterface};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

const DATA_BITS: usize = 24;
const POWER_DOWN_THRESHOLD_NS: u32 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl embedded_hal::digital::Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct SimState {
    codes: VecDeque<u32>,
    current: Option<u32>,
    pulses: usize,
    completed_frame_pulses: Vec<usize>,
    clock_high: bool,
    data_high: bool,
    powered_down: bool,
    poll_delays: usize,
    fail_data_reads: bool,
}

impl SimState {
    fn ready(&self) -> bool {
        !self.powered_down && !self.codes.is_empty()
    }

    fn finish_frame(&mut self) {
        if self.current.take().is_some() {
            self.completed_frame_pulses.push(self.pulses);
        }
        self.pulses = 0;
    }

    fn rising_edge(&mut self) {
        if self.current.is_none() {
            if !self.ready() {
                return;
            }
            self.current = self.codes.pop_front();
            self.pulses = 0;
        }
        self.pulses += 1;
    }

    fn falling_edge(&mut self) {
        self.powered_down = false;
        if let Some(code) = self.current {
            self.data_high = if self.pulses <= DATA_BITS {
                (code >> (DATA_BITS - self.pulses)) & 1 == 1
            } else {
                true
            };
        }
    }

    fn enter_power_down(&mut self) {
        self.powered_down = true;
        if let Some(code) = self.current {
            // the pulse being held high is not part of the frame
            self.pulses -= 1;
            if self.pulses > DATA_BITS {
                self.finish_frame();
            } else {
                self.current = None;
                self.pulses = 0;
                self.codes.push_front(code);
            }
        }
    }
}

/// An HX711 on the other end of fake lines. Queued 24-bit codes are shifted out on clock
/// edges, trailing pulses are counted per frame, and a delay taken with the clock high for at
/// least 60us puts it to sleep until the clock next falls.
#[derive(Clone, Default)]
pub struct SimulatedHx711 {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedHx711 {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap()
    }

    pub fn queue_codes(&self, codes: &[u32]) {
        self.state().codes.extend(codes.iter().copied());
    }

    /// Queue signed samples as their 24-bit two's complement codes.
    pub fn queue_samples(&self, samples: &[i32]) {
        self.state().codes.extend(samples.iter().map(|s| (*s as u32) & 0xFF_FFFF));
    }

    pub fn queued_codes(&self) -> usize {
        self.state().codes.len()
    }

    /// Clock pulses of every frame so far, including one still in progress.
    pub fn frame_pulses(&self) -> Vec<usize> {
        let state = self.state();
        let mut pulses = state.completed_frame_pulses.clone();
        if state.current.is_some() {
            pulses.push(state.pulses);
        }
        pulses
    }

    pub fn is_powered_down(&self) -> bool {
        self.state().powered_down
    }

    pub fn clock_is_high(&self) -> bool {
        self.state().clock_high
    }

    /// Delays of 60us or more taken with the clock low.
    pub fn poll_delays(&self) -> usize {
        self.state().poll_delays
    }

    pub fn fail_data_reads(&self) {
        self.state().fail_data_reads = true;
    }

    pub fn clock(&self) -> SimClock {
        SimClock { sim: self.clone() }
    }

    pub fn data(&self) -> SimData {
        SimData { sim: self.clone() }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay { sim: self.clone() }
    }

    pub fn line_provider(&self) -> SimLineProvider {
        SimLineProvider {
            sim: self.clone(),
            busy: Vec::new(),
            claimed: Vec::new(),
        }
    }
}

pub struct SimClock {
    sim: SimulatedHx711,
}

impl ErrorType for SimClock {
    type Error = SimPinError;
}

impl OutputPin for SimClock {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        let mut state = self.sim.state();
        if state.clock_high {
            state.clock_high = false;
            state.falling_edge();
        }
        state.powered_down = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        let mut state = self.sim.state();
        if !state.clock_high {
            state.clock_high = true;
            state.rising_edge();
        }
        Ok(())
    }
}

pub struct SimData {
    sim: SimulatedHx711,
}

impl ErrorType for SimData {
    type Error = SimPinError;
}

impl InputPin for SimData {
    /// Bit sampling during a frame.
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        let state = self.sim.state();
        if state.fail_data_reads {
            return Err(SimPinError);
        }
        if state.current.is_some() {
            Ok(state.data_high)
        } else {
            Ok(!state.ready())
        }
    }

    /// Readiness poll. Closes the frame before it.
    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        let mut state = self.sim.state();
        if state.fail_data_reads {
            return Err(SimPinError);
        }
        state.finish_frame();
        Ok(state.ready())
    }
}

pub struct SimDelay {
    sim: SimulatedHx711,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        if ns < POWER_DOWN_THRESHOLD_NS {
            return;
        }
        let mut state = self.sim.state();
        if state.clock_high {
            state.enter_power_down();
        } else {
            state.poll_delays += 1;
        }
    }
}

pub struct SimLineProvider {
    sim: SimulatedHx711,
    busy: Vec<u32>,
    claimed: Vec<(u32, bool)>,
}

impl SimLineProvider {
    pub fn mark_busy(&mut self, line: u32) {
        self.busy.push(line);
    }

    /// `(line, is_output)` in claim order.
    pub fn claimed(&self) -> &[(u32, bool)] {
        &self.claimed
    }

    fn claim(&mut self, line: u32, output: bool) -> core::result::Result<(), &'static str> {
        if self.busy.contains(&line) || self.claimed.iter().any(|(l, _)| *l == line) {
            return Err("line busy");
        }
        self.claimed.push((line, output));
        Ok(())
    }
}

impl LineProvider for SimLineProvider {
    type Output = SimClock;
    type Input = SimData;
    type Error = &'static str;

    fn request_output(&mut self, line: u32, _consumer: &str) -> core::result::Result<SimClock, &'static str> {
        self.claim(line, true)?;
        Ok(self.sim.clock())
    }

    fn request_input(&mut self, line: u32, _consumer: &str) -> core::result::Result<SimData, &'static str> {
        self.claim(line, false)?;
        Ok(self.sim.data())
    }
}

pub fn sim_hx711(sim: &SimulatedHx711, config: Hx711Config) -> Hx711<SimClock, SimData, SimDelay> {
    Hx711::new(sim.clock(), sim.data(), sim.delay(), config)
}

/// Strain gauge returning queued samples, for exercising aggregation without bit timing.
pub struct ScriptedGauge {
    samples: VecDeque<i32>,
    echo_gain: bool,
    gain: Gain,
    power_state: PowerState,
    pub gain_history: Vec<Gain>,
    pub resets: usize,
    pub readings: usize,
}

impl ScriptedGauge {
    pub fn new(samples: &[i32]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            echo_gain: false,
            gain: Gain::Gain128,
            power_state: PowerState::Active,
            gain_history: Vec::new(),
            resets: 0,
            readings: 0,
        }
    }

    /// Every reading returns the gain factor it was taken at.
    pub fn echo_gain() -> Self {
        Self {
            echo_gain: true,
            ..Self::new(&[])
        }
    }

    pub fn push_samples(&mut self, samples: &[i32]) {
        self.samples.extend(samples.iter().copied());
    }
}

impl StrainGaugeInterface for ScriptedGauge {
    fn initialize(&mut self) -> Result<()> {
        self.resets += 1;
        self.power_state = PowerState::Active;
        Ok(())
    }

    fn get_next_reading(&mut self) -> Result<i32> {
        self.power_state = PowerState::Active;
        self.readings += 1;
        if self.echo_gain {
            return Ok(self.gain.factor() as i32);
        }
        self.samples.pop_front().ok_or(Error::DeviceNotResponding)
    }

    fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.gain = gain;
        self.gain_history.push(gain);
        Ok(())
    }

    fn gain(&self) -> Gain {
        self.gain
    }

    fn power_down(&mut self) -> Result<()> {
        self.power_state = PowerState::PoweredDown;
        Ok(())
    }

    fn power_up(&mut self) -> Result<()> {
        self.power_state = PowerState::Active;
        Ok(())
    }

    fn power_state(&self) -> PowerState {
        self.power_state
    }
}
