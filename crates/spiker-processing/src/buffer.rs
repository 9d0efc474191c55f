//! Bounded sample history with windowed queries

use spiker_core::{SpikerError, SpikerResult};
use std::collections::VecDeque;

/// FIFO of the most recent samples; the oldest sample is evicted on overflow
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<i32>,
    capacity: usize,
    sample_period_ms: u32,
    max_window_ms: u32,
}

impl SampleBuffer {
    /// Create an empty buffer
    pub fn new(capacity: usize, sample_period_ms: u32, max_window_ms: u32) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sample_period_ms: sample_period_ms.max(1),
            max_window_ms,
        }
    }

    /// Append a sample, dropping the oldest one if full
    pub fn push(&mut self, sample: i32) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<i32> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples in chronological order
    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.samples.iter()
    }

    /// Number of samples covering `duration_ms`
    pub fn samples_for(&self, duration_ms: u32) -> SpikerResult<usize> {
        if duration_ms > self.max_window_ms {
            return Err(SpikerError::WindowOutOfRange {
                requested_ms: duration_ms,
                max_ms: self.max_window_ms,
            });
        }
        Ok((duration_ms / self.sample_period_ms) as usize)
    }

    /// The last `duration_ms / period` samples (or fewer if not yet recorded), oldest first
    pub fn window(&self, duration_ms: u32) -> SpikerResult<Vec<i32>> {
        let count = self.samples_for(duration_ms)?.min(self.samples.len());
        let start = self.samples.len() - count;
        Ok(self.samples.range(start..).copied().collect())
    }

    /// Largest sample in the window, 0 when the window is empty
    pub fn max_in_last(&self, duration_ms: u32) -> SpikerResult<i32> {
        Ok(self.window(duration_ms)?.into_iter().max().unwrap_or(0))
    }
}
