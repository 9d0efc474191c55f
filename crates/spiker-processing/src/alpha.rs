//! EEG alpha-band power estimate
//!
//! Alpha power is the share of rectified signal power removed by a notch
//! tuned to the alpha band: the difference between slow moving averages of
//! the raw and the notched deviation from mid-scale, minus a resting baseline.

use crate::config::FrontEndConfig;
use crate::filters::BiquadFilter;
use crate::processor::SampleProcessor;

#[derive(Debug, Clone)]
pub struct AlphaPowerEstimator {
    notch: BiquadFilter,
    dc_offset: f64,
    weight: f64,
    baseline: f64,
    raw_power: f64,
    notched_power: f64,
    alpha_power: f64,
}

impl AlphaPowerEstimator {
    pub fn new(notch: BiquadFilter, dc_offset: f64, weight: f64, baseline: f64) -> Self {
        Self {
            notch,
            dc_offset,
            weight,
            baseline,
            raw_power: 0.0,
            notched_power: 0.0,
            alpha_power: 0.0,
        }
    }

    /// Estimator with a freshly designed notch
    pub fn from_config(config: &FrontEndConfig) -> Self {
        Self::new(
            BiquadFilter::new("eeg_notch", config.notch_coefficients()),
            config.eeg_dc_offset,
            config.eeg_power_weight,
            config.eeg_baseline,
        )
    }

    /// Feed one raw sample and return the updated alpha power
    pub fn update(&mut self, sample: i32) -> f64 {
        let retain = 1.0 - self.weight;

        self.raw_power = self.raw_power * retain
            + self.weight * (f64::from(sample) - self.dc_offset).abs();

        let notched = self.notch.apply(sample);
        self.notched_power = self.notched_power * retain
            + self.weight * (f64::from(notched) - self.dc_offset).abs();

        self.alpha_power = (self.raw_power - self.notched_power - self.baseline).max(0.0);
        self.alpha_power
    }

    pub fn alpha_power(&self) -> f64 {
        self.alpha_power
    }

    pub fn raw_power(&self) -> f64 {
        self.raw_power
    }

    pub fn notched_power(&self) -> f64 {
        self.notched_power
    }

    pub fn reset(&mut self) {
        self.notch.reset();
        self.raw_power = 0.0;
        self.notched_power = 0.0;
        self.alpha_power = 0.0;
    }
}
