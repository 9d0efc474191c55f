//! Recording modes and the per-tick report of the acquisition loop

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpikerError;

/// Signal modality the front end is currently processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// EMG: muscle-power envelope
    Muscle,
    /// ECG: filtered trace, beat detection and heart rate
    Heart,
    /// EEG: raw trace and alpha-band power
    Brain,
}

impl Mode {
    /// All modes in declaration order
    pub const ALL: [Mode; 3] = [Mode::Muscle, Mode::Heart, Mode::Brain];

    /// Levels of the two digital mode-indicator outputs
    pub fn indicator_levels(&self) -> (bool, bool) {
        match self {
            Mode::Muscle => (false, false),
            Mode::Heart => (true, false),
            Mode::Brain => (false, true),
        }
    }

    /// Short modality tag
    pub fn modality(&self) -> &'static str {
        match self {
            Mode::Muscle => "EMG",
            Mode::Heart => "ECG",
            Mode::Brain => "EEG",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Muscle => "muscle",
            Mode::Heart => "heart",
            Mode::Brain => "brain",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = SpikerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "muscle" | "emg" => Ok(Mode::Muscle),
            "heart" | "ecg" => Ok(Mode::Heart),
            "brain" | "eeg" => Ok(Mode::Brain),
            other => Err(SpikerError::ConfigurationError {
                message: format!("Unknown recording mode '{}'", other),
            }),
        }
    }
}

/// Outcome of one acquisition tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Mode the sample was processed in
    pub mode: Mode,
    /// Raw ADC reading
    pub raw: i32,
    /// Value appended to the sample buffer
    pub stored: i32,
    /// A heartbeat was confirmed on this tick
    pub beat: bool,
}

/// Confirmed heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// Time of the beat in milliseconds
    pub timestamp_ms: u64,
    /// Heart rate after this beat (0 until three beats were seen)
    pub bpm: u32,
}
