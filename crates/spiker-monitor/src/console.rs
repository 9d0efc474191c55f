//! Stdout value sink and per-mode metric selection

use spiker_core::{AnalogSource, Clock, Mode, ValueSink};
use spiker_processing::FrontEnd;
use std::io::Write;

/// Writes `name: value` lines to any writer
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink { out: std::io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ValueSink for ConsoleSink<W> {
    fn write_value(&mut self, name: &str, value: f64) {
        // A closed stdout is not worth stopping the sampler for
        let _ = writeln!(self.out, "{}: {}", name, value);
    }
}

/// The metric shown for each mode
pub fn derived_metric<S: AnalogSource, C: Clock>(front_end: &FrontEnd<S, C>, mode: Mode) -> f64 {
    match mode {
        Mode::Muscle => front_end.muscle_power_signal() as f64,
        Mode::Heart => front_end.heart_rate() as f64,
        Mode::Brain => front_end.brain_alpha_power(),
    }
}
