//! Spiker-Simulation: synthetic analog input and the real-time sampling driver
//!
//! Provides EMG/ECG/EEG-like ADC readings for development without hardware,
//! and a tokio task that ticks the front end at its sampling rate.

pub mod real_time_stream;
pub mod signal_patterns;
pub mod analog_simulator;

pub use analog_simulator::*;
pub use real_time_stream::*;
pub use signal_patterns::*;
