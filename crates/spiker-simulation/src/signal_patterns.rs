//! Pre-defined analog signal patterns, in raw ADC counts

use spiker_core::Mode;
use std::f64::consts::PI;

/// Predefined input patterns for each recording mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalPattern {
    /// Flat reading
    Constant { level: f64 },
    /// Pure tone around a baseline
    Sinusoidal {
        frequency: f64,
        amplitude: f64,
        baseline: f64,
    },
    /// Muscle contractions: rectified carrier bursts over a resting level
    MuscleBursts {
        rest_level: f64,
        burst_amplitude: f64,
        carrier_frequency: f64,
        on_duration: f64,
        off_duration: f64,
    },
    /// Heartbeats: narrow R waves at a fixed rate
    HeartBeats {
        bpm: f64,
        baseline: f64,
        r_amplitude: f64,
        r_width: f64,
    },
    /// Resting EEG: alpha rhythm over mid-scale
    BrainAlpha {
        baseline: f64,
        alpha_amplitude: f64,
        alpha_frequency: f64,
    },
}

impl SignalPattern {
    /// Noise-free reading at `time` seconds
    pub fn value_at(&self, time: f64) -> f64 {
        match self {
            SignalPattern::Constant { level } => *level,

            SignalPattern::Sinusoidal { frequency, amplitude, baseline } => {
                baseline + amplitude * (2.0 * PI * frequency * time).sin()
            },

            SignalPattern::MuscleBursts {
                rest_level, burst_amplitude, carrier_frequency, on_duration, off_duration,
            } => {
                let phase = time % (on_duration + off_duration);
                if phase < *on_duration {
                    rest_level + burst_amplitude * (2.0 * PI * carrier_frequency * time).sin().abs()
                } else {
                    *rest_level
                }
            },

            SignalPattern::HeartBeats { bpm, baseline, r_amplitude, r_width } => {
                let period = 60.0 / bpm;
                // R wave centered a little after the start of each period
                let offset = (time % period) - 2.0 * r_width;
                baseline + r_amplitude * (-(offset / r_width).powi(2)).exp()
            },

            SignalPattern::BrainAlpha { baseline, alpha_amplitude, alpha_frequency } => {
                baseline + alpha_amplitude * (2.0 * PI * alpha_frequency * time).sin()
            },
        }
    }

    /// Get pattern description
    pub fn description(&self) -> &'static str {
        match self {
            SignalPattern::Constant { .. } => "Constant level",
            SignalPattern::Sinusoidal { .. } => "Sinusoid",
            SignalPattern::MuscleBursts { .. } => "Muscle contractions",
            SignalPattern::HeartBeats { .. } => "Heartbeats",
            SignalPattern::BrainAlpha { .. } => "Alpha rhythm",
        }
    }

    /// Typical input for a recording mode
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Muscle => SignalPattern::MuscleBursts {
                rest_level: 530.0,
                burst_amplitude: 300.0,
                carrier_frequency: 45.0,
                on_duration: 0.6,
                off_duration: 1.4,
            },
            Mode::Heart => SignalPattern::HeartBeats {
                bpm: 72.0,
                baseline: 512.0,
                r_amplitude: 350.0,
                r_width: 0.012,
            },
            Mode::Brain => SignalPattern::BrainAlpha {
                baseline: 512.0,
                alpha_amplitude: 120.0,
                alpha_frequency: 10.0,
            },
        }
    }

    /// Create common preset patterns
    pub fn presets() -> Vec<(&'static str, SignalPattern)> {
        vec![
            ("Flat", SignalPattern::Constant { level: 512.0 }),
            ("Muscle", SignalPattern::for_mode(Mode::Muscle)),
            ("Resting Heart", SignalPattern::for_mode(Mode::Heart)),
            ("Exercise Heart", SignalPattern::HeartBeats {
                bpm: 140.0, baseline: 512.0, r_amplitude: 300.0, r_width: 0.010
            }),
            ("Eyes Closed", SignalPattern::for_mode(Mode::Brain)),
            ("Eyes Open", SignalPattern::BrainAlpha {
                baseline: 512.0, alpha_amplitude: 15.0, alpha_frequency: 10.0
            }),
            ("Mains Hum", SignalPattern::Sinusoidal {
                frequency: 50.0, amplitude: 40.0, baseline: 512.0
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muscle_bursts_rest_below_noise_floor() {
        let pattern = SignalPattern::for_mode(Mode::Muscle);
        assert_eq!(pattern.value_at(1.0), 530.0);
        let peak = (0..150)
            .map(|i| pattern.value_at(i as f64 / 250.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 780.0);
    }

    #[test]
    fn test_heartbeat_peaks_once_per_period() {
        let pattern = SignalPattern::HeartBeats {
            bpm: 60.0, baseline: 512.0, r_amplitude: 300.0, r_width: 0.01,
        };
        let above: Vec<usize> = (0..500)
            .filter(|&i| pattern.value_at(i as f64 / 250.0) > 700.0)
            .collect();
        assert!(!above.is_empty());
        assert!(above.iter().all(|&i| i % 250 < 15));
    }

    #[test]
    fn test_presets_are_described() {
        for (name, pattern) in SignalPattern::presets() {
            assert!(!name.is_empty());
            assert!(!pattern.description().is_empty());
        }
    }
}
