//! Simulated analog input with realistic noise

use crate::signal_patterns::SignalPattern;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use spiker_core::{AnalogSource, Mode, SpikerError, SpikerResult};

/// Largest reading of the 10-bit converter
pub const ADC_MAX: i32 = 1023;

/// Noise configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Gaussian noise standard deviation in ADC counts (0.0 = no noise)
    pub gaussian_std: f64,
    /// Slow baseline wander amplitude in ADC counts
    pub baseline_wander: f64,
    /// Probability of a motion artifact per sample
    pub motion_artifact_prob: f64,
    /// Motion artifact amplitude in ADC counts
    pub motion_artifact_amp: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            gaussian_std: 4.0,
            baseline_wander: 3.0,
            motion_artifact_prob: 0.0005,
            motion_artifact_amp: 120.0,
        }
    }
}

impl NoiseConfig {
    /// No noise at all
    pub fn clean() -> Self {
        Self {
            gaussian_std: 0.0,
            baseline_wander: 0.0,
            motion_artifact_prob: 0.0,
            motion_artifact_amp: 0.0,
        }
    }
}

/// Configuration for the simulated input
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Sampling rate in Hz
    pub sampling_rate: f64,
    /// Signal pattern to generate
    pub pattern: SignalPattern,
    /// Noise configuration
    pub noise: NoiseConfig,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    /// Typical input for `mode` at 250 Hz
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            sampling_rate: 250.0,
            pattern: SignalPattern::for_mode(mode),
            noise: NoiseConfig::default(),
            seed: None,
        }
    }
}

/// Analog source producing one synthetic ADC reading per call
pub struct AnalogSimulator {
    config: SimulatorConfig,
    rng: rand::rngs::StdRng,
    normal_dist: Normal<f64>,
    time: f64,
}

impl AnalogSimulator {
    /// Create new simulator with configuration
    pub fn new(config: SimulatorConfig) -> SpikerResult<Self> {
        if !(config.sampling_rate > 0.0) {
            return Err(SpikerError::SimulationError {
                message: format!("Sampling rate must be positive, got {}", config.sampling_rate),
            });
        }

        let rng = match config.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };
        let normal_dist = Normal::new(0.0, config.noise.gaussian_std)
            .map_err(|e| SpikerError::SimulationError {
                message: format!("Failed to create normal distribution: {}", e),
            })?;

        Ok(AnalogSimulator {
            config,
            rng,
            normal_dist,
            time: 0.0,
        })
    }

    /// Switch the generated pattern without resetting time
    pub fn set_pattern(&mut self, pattern: SignalPattern) {
        self.config.pattern = pattern;
    }

    pub fn pattern(&self) -> SignalPattern {
        self.config.pattern
    }

    /// Simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn reset_time(&mut self) {
        self.time = 0.0;
    }

    /// Generate `count` consecutive readings
    pub fn generate(&mut self, count: usize) -> Vec<i32> {
        (0..count).map(|_| self.read_sample()).collect()
    }

    fn noise(&mut self) -> f64 {
        let noise = &self.config.noise;
        let mut value = self.normal_dist.sample(&mut self.rng);

        // Slow electrode drift
        value += noise.baseline_wander * (2.0 * std::f64::consts::PI * 0.3 * self.time).sin();

        if noise.motion_artifact_prob > 0.0 && self.rng.gen::<f64>() < noise.motion_artifact_prob {
            let sign = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
            value += sign * noise.motion_artifact_amp;
        }

        value
    }
}

impl AnalogSource for AnalogSimulator {
    fn read_sample(&mut self) -> i32 {
        let clean = self.config.pattern.value_at(self.time);
        let reading = clean + self.noise();
        self.time += 1.0 / self.config.sampling_rate;

        (reading.round() as i32).clamp(0, ADC_MAX)
    }
}
