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
use crate::weight::calibration::CalibrationStore;
use crate::weight::interface::{Gain, PowerState, StrainGaugeInterface};
use crate::weight::statistics::{self, MIN_TRIMMED_SAMPLES};
use crate::weight::{
    Channel, WeighingSystem, DEFAULT_TARE_SAMPLES, DEFAULT_WEIGHT_SAMPLES, MAX_SAMPLES,
};
use heapless::Vec;
use log::{debug, trace, warn};

/// A strain gauge plus the calibration needed to turn its readings into weight.
///
/// Channel A is read at whatever gain is currently selected. Channel B operations switch to
/// gain 32 for their duration and put the previous gain back afterwards, even when the
/// operation itself failed.
pub struct WeightScale<StrainGauge> {
    strain_gauge: StrainGauge,
    calibration: CalibrationStore,
}

impl<StrainGauge> WeightScale<StrainGauge>
where
    StrainGauge: StrainGaugeInterface,
{
    /// Nothing is sent to the gauge; call [`WeightScale::reset`] before the first reading.
    pub fn new(strain_gauge: StrainGauge) -> Self {
        Self::with_calibration(strain_gauge, CalibrationStore::default())
    }

    /// Start from a previously saved calibration.
    pub fn with_calibration(strain_gauge: StrainGauge, calibration: CalibrationStore) -> Self {
        Self {
            strain_gauge,
            calibration,
        }
    }

    pub fn strain_gauge(&self) -> &StrainGauge {
        &self.strain_gauge
    }

    pub fn strain_gauge_mut(&mut self) -> &mut StrainGauge {
        &mut self.strain_gauge
    }

    pub fn into_inner(self) -> StrainGauge {
        self.strain_gauge
    }

    /// Power cycle the gauge. Required once before the first reading.
    pub fn reset(&mut self) -> Result<()> {
        self.strain_gauge.initialize()
    }

    pub fn power_down(&mut self) -> Result<()> {
        self.strain_gauge.power_down()
    }

    pub fn power_up(&mut self) -> Result<()> {
        self.strain_gauge.power_up()
    }

    pub fn power_state(&self) -> PowerState {
        self.strain_gauge.power_state()
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.strain_gauge.set_gain(gain)
    }

    pub fn gain(&self) -> Gain {
        self.strain_gauge.gain()
    }

    pub fn read_single(&mut self) -> Result<i32> {
        self.strain_gauge.get_next_reading()
    }

    pub fn read_median(&mut self, sample_count: usize) -> Result<f64> {
        if sample_count == 1 {
            return Ok(self.read_single()? as f64);
        }
        let mut samples = self.collect_samples(sample_count)?;
        statistics::median(&mut samples)
    }

    pub fn read_trimmed_mean(&mut self, sample_count: usize) -> Result<f64> {
        if sample_count < MIN_TRIMMED_SAMPLES {
            return self.read_median(sample_count);
        }
        let mut samples = self.collect_samples(sample_count)?;
        statistics::trimmed_mean(&mut samples)
    }

    fn collect_samples(&mut self, sample_count: usize) -> Result<Vec<i32, MAX_SAMPLES>> {
        if sample_count == 0 {
            return Err(Error::InvalidArgument("sample count must be at least 1"));
        }
        if sample_count > MAX_SAMPLES {
            return Err(Error::InvalidArgument("too many samples requested"));
        }

        let mut samples = Vec::new();
        for _ in 0..sample_count {
            let reading = self.strain_gauge.get_next_reading()?;
            samples
                .push(reading)
                .map_err(|_| Error::InvalidArgument("too many samples requested"))?;
        }
        trace!("Collected samples {:?}", samples.as_slice());
        Ok(samples)
    }

    /// Store the trimmed mean of `sample_count` readings as the channel's zero point.
    pub fn tare(&mut self, channel: Channel, sample_count: usize) -> Result<f64> {
        let offset = self.on_channel(channel, |scale| scale.read_trimmed_mean(sample_count))?;
        self.calibration.channel_mut(channel).set_offset(offset)?;
        debug!("Channel {} tare offset = {}", channel, offset);
        Ok(offset)
    }

    pub fn offset(&self, channel: Channel) -> f64 {
        self.calibration.channel(channel).offset()
    }

    pub fn set_offset(&mut self, channel: Channel, offset: f64) -> Result<()> {
        self.calibration.channel_mut(channel).set_offset(offset)
    }

    pub fn reference_unit(&self, channel: Channel) -> f64 {
        self.calibration.channel(channel).reference_unit()
    }

    /// Counts per unit of weight. Zero (and non-finite values) are rejected here so a weight
    /// computation never divides by them.
    pub fn set_reference_unit(&mut self, channel: Channel, reference_unit: f64) -> Result<()> {
        self.calibration
            .channel_mut(channel)
            .set_reference_unit(reference_unit)?;
        debug!("Channel {} reference unit = {}", channel, reference_unit);
        Ok(())
    }

    /// Derive the reference unit from a known weight resting on the tared scale. Returns the
    /// new reference unit.
    pub fn calibrate(&mut self, channel: Channel, known_weight: f64, sample_count: usize) -> Result<f64> {
        if known_weight == 0.0 || !known_weight.is_finite() {
            return Err(Error::InvalidArgument("calibration weight must be finite and non-zero"));
        }
        let value = self.get_value(channel, sample_count)?;
        let reference_unit = value / known_weight;
        self.set_reference_unit(channel, reference_unit)?;
        Ok(reference_unit)
    }

    pub fn calibration(&self) -> CalibrationStore {
        self.calibration
    }

    pub fn restore_calibration(&mut self, calibration: CalibrationStore) {
        self.calibration = calibration;
    }

    /// Median reading relative to the tare point, in ADC counts.
    pub fn get_value(&mut self, channel: Channel, sample_count: usize) -> Result<f64> {
        let reading = self.on_channel(channel, |scale| scale.read_median(sample_count))?;
        Ok(self.calibration.channel(channel).value(reading))
    }

    pub fn get_weight(&mut self, channel: Channel, sample_count: usize) -> Result<f64> {
        let reading = self.on_channel(channel, |scale| scale.read_median(sample_count))?;
        let weight = self.calibration.channel(channel).weight(reading);
        trace!("Channel {} reading = {}, weight = {}", channel, reading, weight);
        Ok(weight)
    }

    fn on_channel<T>(&mut self, channel: Channel, operation: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let previous = self.strain_gauge.gain();
        if channel == Channel::A || previous == Gain::Gain32 {
            return operation(self);
        }

        let result = self
            .strain_gauge
            .set_gain(Gain::Gain32)
            .and_then(|_| operation(self));

        if let Err(restore_error) = self.strain_gauge.set_gain(previous) {
            if result.is_ok() {
                return Err(restore_error);
            }
            warn!("Restoring gain {} failed: {:?}", previous.factor(), restore_error);
        }
        result
    }
}

impl<StrainGauge> WeighingSystem for WeightScale<StrainGauge>
where
    StrainGauge: StrainGaugeInterface,
{
    fn tare(&mut self) -> Result<f64> {
        WeightScale::tare(self, Channel::A, DEFAULT_TARE_SAMPLES)
    }

    fn calibrate(&mut self, calibration_mass: f64) -> Result<()> {
        WeightScale::calibrate(self, Channel::A, calibration_mass, DEFAULT_TARE_SAMPLES).map(|_| ())
    }

    fn get_weight(&mut self) -> Result<f64> {
        WeightScale::get_weight(self, Channel::A, DEFAULT_WEIGHT_SAMPLES)
    }
}
