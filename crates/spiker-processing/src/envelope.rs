//! EMG envelope follower: instantaneous peak hold with linear decay

use crate::processor::SampleProcessor;

#[derive(Debug, Clone)]
pub struct EnvelopeTracker {
    noise_floor: i32,
    decay: i32,
    envelope: i32,
}

impl EnvelopeTracker {
    pub fn new(noise_floor: i32, decay: i32) -> Self {
        Self {
            noise_floor,
            decay,
            envelope: 0,
        }
    }

    /// Feed one raw sample and return the updated envelope
    pub fn update(&mut self, sample: i32) -> i32 {
        let adjusted = sample - self.noise_floor;
        if adjusted > 0 && adjusted > self.envelope {
            self.envelope = adjusted;
        }

        // Decay applies every tick, including the one that set a new peak
        self.envelope = (self.envelope - self.decay).max(0);
        self.envelope
    }

    pub fn value(&self) -> i32 {
        self.envelope
    }
}

impl SampleProcessor for EnvelopeTracker {
    fn process_sample(&mut self, sample: i32) -> i32 {
        self.update(sample)
    }

    fn reset(&mut self) {
        self.envelope = 0;
    }

    fn name(&self) -> &str {
        "Envelope Tracker"
    }
}
