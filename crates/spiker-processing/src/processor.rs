//! Core per-sample processor trait

/// A stage that transforms one integer sample at a time
pub trait SampleProcessor: Send {
    /// Process one sample and return the stage output
    fn process_sample(&mut self, sample: i32) -> i32;

    /// Reset processor internal state
    fn reset(&mut self);

    /// Get processor name/identifier
    fn name(&self) -> &str;

    /// Run a block of samples through the stage in place
    fn process_block(&mut self, samples: &mut [i32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
