//! ECG beat detection and heart-rate estimation
//!
//! A beat is a filtered sample whose magnitude crosses the threshold pair,
//! unless the previous beat is within the debounce period. The heart rate is
//! derived from the last three beats, i.e. two inter-beat intervals.

use spiker_core::BeatEvent;
use std::collections::VecDeque;
use tracing::debug;

/// Number of beat timestamps kept for the rate estimate
pub const BEAT_WINDOW: usize = 3;

/// 60 000 ms per minute times the two intervals spanned by the window
const TWO_INTERVAL_MINUTE_MS: u64 = 120_000;

#[derive(Debug, Clone)]
pub struct BeatDetector {
    top_threshold: i32,
    bottom_threshold: i32,
    debounce_ms: u64,
    timestamps: VecDeque<u64>,
    bpm: u32,
}

impl BeatDetector {
    /// Detector firing above `threshold` or below `-threshold`
    pub fn new(threshold: i32, debounce_ms: u64) -> Self {
        Self {
            top_threshold: threshold,
            bottom_threshold: -threshold,
            debounce_ms,
            timestamps: VecDeque::with_capacity(BEAT_WINDOW + 1),
            bpm: 0,
        }
    }

    /// Feed one filtered sample observed at `now_ms`; returns the beat if one was confirmed
    pub fn process(&mut self, sample: i32, now_ms: u64) -> Option<BeatEvent> {
        if sample <= self.top_threshold && sample >= self.bottom_threshold {
            return None;
        }

        if let Some(&last) = self.timestamps.back() {
            if now_ms.saturating_sub(last) <= self.debounce_ms {
                return None;
            }
        }

        self.timestamps.push_back(now_ms);
        if self.timestamps.len() > BEAT_WINDOW {
            self.timestamps.pop_front();
        }

        if self.timestamps.len() == BEAT_WINDOW {
            let span = self.timestamps[2] - self.timestamps[0];
            if span > 0 {
                self.bpm = (TWO_INTERVAL_MINUTE_MS / span) as u32;
                debug!(bpm = self.bpm, span_ms = span, "heart rate updated");
            }
        }

        debug!(timestamp_ms = now_ms, sample, "beat confirmed");
        Some(BeatEvent {
            timestamp_ms: now_ms,
            bpm: self.bpm,
        })
    }

    /// Last computed rate; sticky until three beats are seen again
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Confirmed beat times, oldest first
    pub fn timestamps(&self) -> Vec<u64> {
        self.timestamps.iter().copied().collect()
    }

    /// Forget beats and rate
    pub fn reset(&mut self) {
        self.timestamps.clear();
        self.bpm = 0;
    }
}
