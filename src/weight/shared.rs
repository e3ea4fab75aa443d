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

use crate::error::Result;
use crate::weight::interface::{Gain, PowerState, StrainGaugeInterface};
use crate::weight::weight::WeightScale;
use crate::weight::{Channel, WeighingSystem};
use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// [`WeightScale`] behind a blocking mutex, for scales shared between threads or tasks.
///
/// Each call holds the lock for the whole operation: every frame of a median, the gain switch
/// around a channel B read, and the timed pulse of a power transition. Nothing else can clock
/// the converter in between. Use `CriticalSectionRawMutex` when callers run on different
/// threads or interrupt priorities, `NoopRawMutex` when they all live on one executor.
///
/// The lock is held while waiting for the converter to become ready, so keep
/// `ready_timeout` short where other critical sections must stay responsive.
pub struct SharedWeightScale<M: RawMutex, StrainGauge> {
    scale: Mutex<M, RefCell<WeightScale<StrainGauge>>>,
}

impl<M, StrainGauge> SharedWeightScale<M, StrainGauge>
where
    M: RawMutex,
    StrainGauge: StrainGaugeInterface,
{
    pub fn new(scale: WeightScale<StrainGauge>) -> Self {
        Self {
            scale: Mutex::new(RefCell::new(scale)),
        }
    }

    /// Run several operations as one critical section. Must not be re-entered from `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut WeightScale<StrainGauge>) -> R) -> R {
        self.scale.lock(|scale| f(&mut scale.borrow_mut()))
    }

    pub fn into_inner(self) -> WeightScale<StrainGauge> {
        self.scale.into_inner().into_inner()
    }

    pub fn reset(&self) -> Result<()> {
        self.lock(|scale| scale.reset())
    }

    pub fn power_down(&self) -> Result<()> {
        self.lock(|scale| scale.power_down())
    }

    pub fn power_up(&self) -> Result<()> {
        self.lock(|scale| scale.power_up())
    }

    pub fn power_state(&self) -> PowerState {
        self.lock(|scale| scale.power_state())
    }

    pub fn set_gain(&self, gain: Gain) -> Result<()> {
        self.lock(|scale| scale.set_gain(gain))
    }

    pub fn gain(&self) -> Gain {
        self.lock(|scale| scale.gain())
    }

    pub fn read_median(&self, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.read_median(sample_count))
    }

    pub fn read_trimmed_mean(&self, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.read_trimmed_mean(sample_count))
    }

    pub fn tare(&self, channel: Channel, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.tare(channel, sample_count))
    }

    pub fn set_reference_unit(&self, channel: Channel, reference_unit: f64) -> Result<()> {
        self.lock(|scale| scale.set_reference_unit(channel, reference_unit))
    }

    pub fn calibrate(&self, channel: Channel, known_weight: f64, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.calibrate(channel, known_weight, sample_count))
    }

    pub fn get_value(&self, channel: Channel, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.get_value(channel, sample_count))
    }

    pub fn get_weight(&self, channel: Channel, sample_count: usize) -> Result<f64> {
        self.lock(|scale| scale.get_weight(channel, sample_count))
    }
}

impl<M, StrainGauge> WeighingSystem for SharedWeightScale<M, StrainGauge>
where
    M: RawMutex,
    StrainGauge: StrainGaugeInterface,
{
    fn tare(&mut self) -> Result<f64> {
        self.lock(|scale| WeighingSystem::tare(scale))
    }

    fn calibrate(&mut self, calibration_mass: f64) -> Result<()> {
        self.lock(|scale| WeighingSystem::calibrate(scale, calibration_mass))
    }

    fn get_weight(&mut self) -> Result<f64> {
        self.lock(|scale| WeighingSystem::get_weight(scale))
    }
}
