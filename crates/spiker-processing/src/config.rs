//! Configuration of the front end's fixed processing parameters

use crate::filters::{validate_design, BiquadCoefficients};
use serde::{Deserialize, Serialize};
use spiker_core::{config_error, SpikerError, SpikerResult};

/// Every constant the pipelines depend on.
///
/// A front end is built from one configuration and keeps it for its whole
/// lifetime; the sampling rate is not reconfigurable at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontEndConfig {
    /// Sampling rate in Hz
    pub sampling_rate_hz: f64,

    /// EEG notch center frequency (alpha band) in Hz
    pub notch_frequency_hz: f64,
    /// EEG notch quality factor
    pub notch_q: f64,

    /// ECG lowpass cutoff in Hz
    pub ecg_lowpass_hz: f64,
    /// ECG highpass cutoff in Hz
    pub ecg_highpass_hz: f64,
    /// Quality factor of both ECG filters
    pub ecg_filter_q: f64,
    /// Beat threshold magnitude; fires above +t or below -t
    pub ecg_threshold: i32,
    /// Minimum time between accepted beats in ms
    pub debounce_ms: u64,

    /// EMG readings at or below this level carry no muscle activity
    pub noise_floor: i32,
    /// Envelope decrement per sample
    pub envelope_decay: i32,

    /// Mid-scale reading of the analog input
    pub eeg_dc_offset: f64,
    /// Weight of a new sample in the EEG power averages
    pub eeg_power_weight: f64,
    /// Resting-state bias removed from alpha power
    pub eeg_baseline: f64,

    /// Sample history length
    pub buffer_capacity: usize,
    /// Largest window a query may request, in ms
    pub max_window_ms: u32,
    /// Envelope-decay steps that make up the peak-count hysteresis
    pub peak_steps: i32,
}

impl Default for FrontEndConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 250.0,
            notch_frequency_hz: 10.0,
            notch_q: 1.0,
            ecg_lowpass_hz: 40.0,
            ecg_highpass_hz: 3.0,
            ecg_filter_q: 0.5,
            ecg_threshold: 70,
            debounce_ms: 300,
            noise_floor: 580,
            envelope_decay: 2,
            eeg_dc_offset: 512.0,
            eeg_power_weight: 0.01,
            eeg_baseline: 20.0,
            buffer_capacity: 750,
            max_window_ms: 3000,
            peak_steps: 20,
        }
    }
}

impl FrontEndConfig {
    /// Sampling period in whole milliseconds (4 at 250 Hz)
    pub fn sample_period_ms(&self) -> u32 {
        (1000.0 / self.sampling_rate_hz).round() as u32
    }

    /// Sampling period in microseconds, for drivers that schedule ticks
    pub fn sample_period_us(&self) -> u64 {
        (1_000_000.0 / self.sampling_rate_hz).round() as u64
    }

    pub fn notch_coefficients(&self) -> BiquadCoefficients {
        BiquadCoefficients::notch(self.notch_frequency_hz, self.notch_q, self.sampling_rate_hz)
    }

    pub fn ecg_lowpass_coefficients(&self) -> BiquadCoefficients {
        BiquadCoefficients::lowpass(self.ecg_lowpass_hz, self.ecg_filter_q, self.sampling_rate_hz)
    }

    pub fn ecg_highpass_coefficients(&self) -> BiquadCoefficients {
        BiquadCoefficients::highpass(self.ecg_highpass_hz, self.ecg_filter_q, self.sampling_rate_hz)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SpikerResult<()> {
        if !(self.sampling_rate_hz > 0.0 && self.sampling_rate_hz <= 1000.0) {
            return Err(config_error!(
                "Sampling rate {}Hz must be positive and at most 1000Hz",
                self.sampling_rate_hz
            ));
        }

        validate_design(self.notch_frequency_hz, self.notch_q, self.sampling_rate_hz)?;
        validate_design(self.ecg_lowpass_hz, self.ecg_filter_q, self.sampling_rate_hz)?;
        validate_design(self.ecg_highpass_hz, self.ecg_filter_q, self.sampling_rate_hz)?;

        if self.ecg_threshold < 0 {
            return Err(config_error!("ECG threshold must not be negative"));
        }

        if self.envelope_decay < 0 || self.peak_steps < 0 {
            return Err(config_error!("Envelope decay and peak steps must not be negative"));
        }

        if !(self.eeg_power_weight > 0.0 && self.eeg_power_weight < 1.0) {
            return Err(config_error!(
                "EEG power weight {} must lie in (0, 1)",
                self.eeg_power_weight
            ));
        }

        if self.buffer_capacity == 0 {
            return Err(config_error!("Buffer capacity must be greater than 0"));
        }

        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> SpikerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SpikerError::ConfigurationError {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> SpikerResult<Self> {
        serde_json::from_str(json).map_err(|e| SpikerError::ConfigurationError {
            message: format!("Failed to deserialize configuration: {}", e),
        })
    }
}
