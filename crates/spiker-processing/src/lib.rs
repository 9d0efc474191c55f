//! Spiker-Processing: DSP core of the single-channel biosignal front end
//!
//! Biquad design and filtering, the EMG envelope follower, ECG beat
//! detection, EEG alpha-power estimation, the bounded sample history and
//! the per-sample acquisition loop that ties them together.

pub mod processor;
pub mod filters;
pub mod buffer;
pub mod envelope;
pub mod heart;
pub mod alpha;
pub mod peaks;
pub mod config;
pub mod acquisition;

pub use processor::SampleProcessor;
pub use filters::{FilterShape, BiquadCoefficients, BiquadFilter, FilterChain};
pub use buffer::SampleBuffer;
pub use envelope::EnvelopeTracker;
pub use heart::BeatDetector;
pub use alpha::AlphaPowerEstimator;
pub use peaks::PeakCounter;
pub use config::FrontEndConfig;
pub use acquisition::FrontEnd;
