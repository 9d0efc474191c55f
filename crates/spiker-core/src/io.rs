//! External capabilities the front end is driven through
//!
//! The processing core never touches hardware directly: it reads samples
//! from an [`AnalogSource`], asks a [`Clock`] for the time, drives a
//! [`ModeIndicator`] and writes values to a [`ValueSink`].

use crate::signal_types::BeatEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Provides one raw ADC reading per call (0..=1023 on the reference hardware)
pub trait AnalogSource: Send {
    /// Read one sample
    fn read_sample(&mut self) -> i32;
}

/// Millisecond time base
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed epoch
    fn now_ms(&self) -> u64;
}

/// Two digital outputs reflecting the active mode
pub trait ModeIndicator: Send {
    /// Drive both outputs
    fn set_levels(&mut self, first: bool, second: bool);
}

/// Named numeric output channel
pub trait ValueSink {
    /// Emit one value under `name`
    fn write_value(&mut self, name: &str, value: f64);
}

/// Channel name used by [`print`]
pub const VALUE_CHANNEL: &str = "Value";

/// Pass a value through to the sink under the default channel name
pub fn print<V: ValueSink + ?Sized>(sink: &mut V, value: f64) {
    sink.write_value(VALUE_CHANNEL, value);
}

/// Callback fired synchronously from the sampling tick on every confirmed beat.
///
/// Runs inside the tick: a slow handler delays sampling.
pub type HeartBeatSubscriber = Box<dyn FnMut(&BeatEvent) + Send>;

/// Replays recorded samples, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<i32>,
    position: usize,
}

impl ReplaySource {
    /// Create a source over `samples`; an empty recording reads as 0
    pub fn new(samples: Vec<i32>) -> Self {
        Self { samples, position: 0 }
    }

    /// Source that always reads `value`
    pub fn constant(value: i32) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples read so far
    pub fn position(&self) -> usize {
        self.position
    }
}

impl AnalogSource for ReplaySource {
    fn read_sample(&mut self) -> i32 {
        if self.samples.is_empty() {
            return 0;
        }
        let value = self.samples[self.position % self.samples.len()];
        self.position += 1;
        value
    }
}

/// Clock advanced explicitly; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(start_ms)) }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Wall-clock time since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Indicator that records the last levels it was driven to
#[derive(Debug, Clone, Default)]
pub struct LatchedIndicator {
    levels: Arc<std::sync::Mutex<(bool, bool)>>,
}

impl LatchedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last levels written
    pub fn levels(&self) -> (bool, bool) {
        match self.levels.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl ModeIndicator for LatchedIndicator {
    fn set_levels(&mut self, first: bool, second: bool) {
        match self.levels.lock() {
            Ok(mut guard) => *guard = (first, second),
            Err(poisoned) => *poisoned.into_inner() = (first, second),
        }
    }
}
