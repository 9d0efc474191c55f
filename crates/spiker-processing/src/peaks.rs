//! Hysteresis peak counting over a window of samples

/// Counts peaks that are followed by a drop deeper than the hysteresis depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakCounter {
    hysteresis: i64,
}

impl PeakCounter {
    /// Depth of `decay * steps`: the drop an envelope makes in `steps` ticks
    pub fn new(decay: i32, steps: i32) -> Self {
        Self::with_hysteresis(i64::from(decay) * i64::from(steps))
    }

    pub fn with_hysteresis(hysteresis: i64) -> Self {
        Self { hysteresis }
    }

    pub fn hysteresis(&self) -> i64 {
        self.hysteresis
    }

    /// Number of confirmed peaks in `window`
    pub fn count(&self, window: &[i32]) -> usize {
        let mut previous: Option<i32> = None;
        let mut rising = false;
        let mut peak: Option<i32> = None;
        let mut peaks = 0;

        for &value in window {
            match previous {
                Some(prev) if value <= prev => {
                    // Only a fall that follows a rise can confirm a peak
                    if rising {
                        let top = *peak.get_or_insert(prev);
                        if i64::from(top) - i64::from(value) > self.hysteresis {
                            peaks += 1;
                            rising = false;
                        }
                    }
                }
                _ => {
                    rising = true;
                    peak = None;
                }
            }
            previous = Some(value);
        }

        peaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(peaks: usize, amplitude: i32, step: i32) -> Vec<i32> {
        let mut samples = Vec::new();
        for _ in 0..peaks {
            samples.extend((0..amplitude).step_by(step as usize));
            samples.extend((1..=amplitude).rev().step_by(step as usize));
        }
        samples.push(0);
        samples
    }

    #[test]
    fn test_triangle_wave_peaks() {
        let counter = PeakCounter::new(2, 20);
        for n in [1, 3, 7] {
            assert_eq!(counter.count(&triangle(n, 200, 10)), n);
        }
    }

    #[test]
    fn test_shallow_ripples_are_ignored() {
        let counter = PeakCounter::new(2, 20);
        let ripples: Vec<i32> = (0..100).map(|i| if i % 2 == 0 { 100 } else { 80 }).collect();
        assert_eq!(counter.count(&ripples), 0);
    }

    #[test]
    fn test_drop_must_exceed_hysteresis() {
        let counter = PeakCounter::new(2, 20);
        assert_eq!(counter.count(&[0, 100, 60]), 0);
        assert_eq!(counter.count(&[0, 100, 59]), 1);
    }

    #[test]
    fn test_plateau_peak() {
        let counter = PeakCounter::new(2, 20);
        assert_eq!(counter.count(&[0, 100, 100, 100, 50]), 1);
    }

    #[test]
    fn test_empty_and_falling_windows() {
        let counter = PeakCounter::new(2, 20);
        assert_eq!(counter.count(&[]), 0);
        assert_eq!(counter.count(&[300, 200, 100, 0]), 1);
    }
}
