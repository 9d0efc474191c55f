//! Biquad filter design and application

use crate::config::FrontEndConfig;
use crate::processor::SampleProcessor;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use spiker_core::{SpikerError, SpikerResult};
use std::f64::consts::PI;

/// Filter shapes the designer supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterShape {
    /// Band-stop around a center frequency
    Notch,
    /// Second-order lowpass
    Lowpass,
    /// Second-order highpass
    Highpass,
}

/// Normalized biquad coefficients (a0 folded in)
///
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Design coefficients for `shape` at `freq` Hz with quality factor `q`.
    ///
    /// Expects `0 < freq < sampling_rate / 2` and `q > 0`; see [`validate_design`].
    pub fn design(shape: FilterShape, freq: f64, q: f64, sampling_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sampling_rate;
        let sin_w = omega.sin();
        let cos_w = omega.cos();
        let alpha = sin_w / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1, b2) = match shape {
            FilterShape::Notch => (1.0, -2.0 * cos_w, 1.0),
            FilterShape::Lowpass => ((1.0 - cos_w) / 2.0, 1.0 - cos_w, (1.0 - cos_w) / 2.0),
            FilterShape::Highpass => ((1.0 + cos_w) / 2.0, -(1.0 + cos_w), (1.0 + cos_w) / 2.0),
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    pub fn notch(center_freq: f64, q: f64, sampling_rate: f64) -> Self {
        Self::design(FilterShape::Notch, center_freq, q, sampling_rate)
    }

    pub fn lowpass(cutoff_freq: f64, q: f64, sampling_rate: f64) -> Self {
        Self::design(FilterShape::Lowpass, cutoff_freq, q, sampling_rate)
    }

    pub fn highpass(cutoff_freq: f64, q: f64, sampling_rate: f64) -> Self {
        Self::design(FilterShape::Highpass, cutoff_freq, q, sampling_rate)
    }

    /// Coefficients as `[b0, b1, b2, a1, a2]`
    pub fn as_array(&self) -> [f64; 5] {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
    }

    /// Steady-state gain for a constant input
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// |H(e^jw)| at `freq` Hz
    pub fn magnitude_response(&self, freq: f64, sampling_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sampling_rate;
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let numerator = Complex::new(self.b0, 0.0) + z1 * self.b1 + z2 * self.b2;
        let denominator = Complex::new(1.0, 0.0) + z1 * self.a1 + z2 * self.a2;

        (numerator / denominator).norm()
    }
}

/// Check that a design request is inside the designable range
pub fn validate_design(freq: f64, q: f64, sampling_rate: f64) -> SpikerResult<()> {
    if !(sampling_rate > 0.0) {
        return Err(SpikerError::InvalidFilterDesign {
            reason: "Sampling rate must be positive",
            frequency: freq,
            sampling_rate,
        });
    }
    if !(freq > 0.0 && freq < sampling_rate / 2.0) {
        return Err(SpikerError::InvalidFilterDesign {
            reason: "Frequency must lie between 0 and Nyquist",
            frequency: freq,
            sampling_rate,
        });
    }
    if !(q > 0.0) {
        return Err(SpikerError::InvalidFilterDesign {
            reason: "Quality factor must be positive",
            frequency: freq,
            sampling_rate,
        });
    }
    Ok(())
}

/// Truncate toward zero into a wrapping 32-bit signed integer
pub(crate) fn truncate_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

/// Stateful second-order IIR section
///
/// The returned sample is truncated to an integer and that integer is what
/// the next stage sees; the output history keeps the unrounded value.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    name: &'static str,
    coeffs: BiquadCoefficients,
    // Input history
    x1: f64, x2: f64,
    // Output history
    y1: f64, y2: f64,
}

impl BiquadFilter {
    pub fn new(name: &'static str, coeffs: BiquadCoefficients) -> Self {
        Self {
            name,
            coeffs,
            x1: 0.0, x2: 0.0,
            y1: 0.0, y2: 0.0,
        }
    }

    /// Filter a single sample
    pub fn apply(&mut self, sample: i32) -> i32 {
        let c = &self.coeffs;
        let input = f64::from(sample);
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        truncate_to_i32(output)
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }
}

impl SampleProcessor for BiquadFilter {
    fn process_sample(&mut self, sample: i32) -> i32 {
        self.apply(sample)
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Cascade of sample processors applied in insertion order
pub struct FilterChain {
    stages: Vec<Box<dyn SampleProcessor>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage to the end of the chain
    pub fn add_stage(&mut self, stage: Box<dyn SampleProcessor>) {
        self.stages.push(stage);
    }

    /// ECG band-limiting: lowpass then highpass, freshly designed
    pub fn ecg(config: &FrontEndConfig) -> Self {
        let mut chain = FilterChain::new();
        chain.add_stage(Box::new(BiquadFilter::new("ecg_lowpass", config.ecg_lowpass_coefficients())));
        chain.add_stage(Box::new(BiquadFilter::new("ecg_highpass", config.ecg_highpass_coefficients())));
        chain
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in processing order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleProcessor for FilterChain {
    fn process_sample(&mut self, sample: i32) -> i32 {
        self.stages
            .iter_mut()
            .fold(sample, |value, stage| stage.process_sample(value))
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    fn name(&self) -> &str {
        "Filter Chain"
    }
}
