//! Per-sample acquisition loop
//!
//! [`FrontEnd`] owns every piece of per-mode state and advances by one
//! sample on each [`FrontEnd::tick`]. Scheduling is left to the caller:
//! a timer task, a test, or a benchmark calls `tick` once per sampling
//! period.

use crate::alpha::AlphaPowerEstimator;
use crate::buffer::SampleBuffer;
use crate::config::FrontEndConfig;
use crate::envelope::EnvelopeTracker;
use crate::filters::FilterChain;
use crate::heart::BeatDetector;
use crate::peaks::PeakCounter;
use crate::processor::SampleProcessor;
use spiker_core::{
    AnalogSource, Clock, HeartBeatSubscriber, Mode, ModeIndicator, RecordingSession,
    SpikerResult, TickReport,
};
use tracing::{debug, info};

/// Whether the sampling loop has ever been activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running(Mode),
}

/// Single-channel biosignal front end
pub struct FrontEnd<S: AnalogSource, C: Clock> {
    config: FrontEndConfig,
    source: S,
    clock: C,
    state: LoopState,
    /// Processed history: filtered ECG, EMG envelope or raw EEG
    buffer: SampleBuffer,
    /// Unfiltered ECG history
    raw_history: SampleBuffer,
    ecg_filters: FilterChain,
    envelope: EnvelopeTracker,
    beats: BeatDetector,
    alpha: AlphaPowerEstimator,
    peak_counter: PeakCounter,
    subscriber: Option<HeartBeatSubscriber>,
    indicator: Option<Box<dyn ModeIndicator>>,
    session: Option<RecordingSession>,
}

impl<S: AnalogSource, C: Clock> FrontEnd<S, C> {
    /// Create an idle front end reading from `source`
    pub fn new(config: FrontEndConfig, source: S, clock: C) -> SpikerResult<Self> {
        config.validate()?;

        let period = config.sample_period_ms();
        Ok(FrontEnd {
            buffer: SampleBuffer::new(config.buffer_capacity, period, config.max_window_ms),
            raw_history: SampleBuffer::new(config.buffer_capacity, period, config.max_window_ms),
            ecg_filters: FilterChain::ecg(&config),
            envelope: EnvelopeTracker::new(config.noise_floor, config.envelope_decay),
            beats: BeatDetector::new(config.ecg_threshold, config.debounce_ms),
            alpha: AlphaPowerEstimator::from_config(&config),
            peak_counter: PeakCounter::new(config.envelope_decay, config.peak_steps),
            subscriber: None,
            indicator: None,
            session: None,
            state: LoopState::Idle,
            config,
            source,
            clock,
        })
    }

    /// Attach the digital mode-indicator outputs
    pub fn with_indicator(mut self, indicator: Box<dyn ModeIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn start_muscle_recording(&mut self) -> bool {
        self.start_recording(Mode::Muscle)
    }

    pub fn start_heart_recording(&mut self) -> bool {
        self.start_recording(Mode::Heart)
    }

    pub fn start_brain_recording(&mut self) -> bool {
        self.start_recording(Mode::Brain)
    }

    /// Switch to `mode` with cleared history and fresh filters.
    ///
    /// Returns `true` only on the first activation, when the caller should
    /// begin scheduling ticks. Later calls only change the mode.
    pub fn start_recording(&mut self, mode: Mode) -> bool {
        let first_activation = self.state == LoopState::Idle;
        self.state = LoopState::Running(mode);

        self.buffer.clear();
        self.raw_history.clear();
        self.envelope.reset();
        self.beats.reset();
        self.alpha.reset();
        match mode {
            Mode::Heart => self.ecg_filters = FilterChain::ecg(&self.config),
            Mode::Brain => self.alpha = AlphaPowerEstimator::from_config(&self.config),
            Mode::Muscle => {}
        }

        let (first, second) = mode.indicator_levels();
        self.drive_indicator(first, second);

        let session = RecordingSession::new(mode, self.clock.now_ms());
        info!(session = %session.id, %mode, modality = mode.modality(), first_activation, "recording started");
        self.session = Some(session);

        first_activation
    }

    /// Clear history, beats, envelope and heart rate.
    ///
    /// The loop keeps ticking in the current mode afterwards.
    pub fn stop_recording(&mut self) {
        self.buffer.clear();
        self.raw_history.clear();
        self.beats.reset();
        self.envelope.reset();
        self.drive_indicator(false, false);

        if let Some(session) = self.session.take() {
            info!(
                session = %session.id,
                elapsed_ms = session.elapsed_ms(self.clock.now_ms()),
                "recording stopped"
            );
        }
    }

    /// Acquire and process one sample; `None` while idle
    pub fn tick(&mut self) -> Option<TickReport> {
        let mode = match self.state {
            LoopState::Idle => return None,
            LoopState::Running(mode) => mode,
        };

        let raw = self.source.read_sample();
        let (stored, beat) = match mode {
            Mode::Heart => {
                self.raw_history.push(raw);
                let filtered = self.ecg_filters.process_sample(raw);
                let event = self.beats.process(filtered, self.clock.now_ms());
                if let (Some(event), Some(subscriber)) = (event.as_ref(), self.subscriber.as_mut()) {
                    subscriber(event);
                }
                (filtered, event.is_some())
            }
            Mode::Muscle => (self.envelope.update(raw), false),
            Mode::Brain => {
                self.alpha.update(raw);
                (raw, false)
            }
        };
        self.buffer.push(stored);

        Some(TickReport { mode, raw, stored, beat })
    }

    /// Register the heartbeat callback, replacing any previous one
    pub fn on_heart_beat(&mut self, subscriber: HeartBeatSubscriber) {
        if self.subscriber.replace(subscriber).is_some() {
            debug!("heartbeat subscriber replaced");
        }
    }

    pub fn clear_heart_beat_subscriber(&mut self) {
        self.subscriber = None;
    }

    /// Active mode, `None` before the first start
    pub fn mode(&self) -> Option<Mode> {
        match self.state {
            LoopState::Idle => None,
            LoopState::Running(mode) => Some(mode),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != LoopState::Idle
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &FrontEndConfig {
        &self.config
    }

    /// Most recently stored sample in any mode
    pub fn latest_sample(&self) -> Option<i32> {
        self.buffer.latest()
    }

    /// Number of samples currently held
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// EMG envelope; 0 outside muscle mode
    pub fn muscle_power_signal(&self) -> i32 {
        if self.mode() == Some(Mode::Muscle) {
            self.envelope.value()
        } else {
            0
        }
    }

    /// Latest filtered ECG sample; 0 outside heart mode or before the first sample
    pub fn heart_signal(&self) -> i32 {
        self.latest_in(Mode::Heart)
    }

    /// Heart rate in BPM; 0 outside heart mode
    pub fn heart_rate(&self) -> u32 {
        if self.mode() == Some(Mode::Heart) {
            self.beats.bpm()
        } else {
            0
        }
    }

    /// Confirmed beat times, oldest first
    pub fn beat_timestamps(&self) -> Vec<u64> {
        self.beats.timestamps()
    }

    /// Latest raw EEG sample; 0 outside brain mode or before the first sample
    pub fn brain_signal(&self) -> i32 {
        self.latest_in(Mode::Brain)
    }

    /// Alpha-band power; 0 outside brain mode
    pub fn brain_alpha_power(&self) -> f64 {
        if self.mode() == Some(Mode::Brain) {
            self.alpha.alpha_power()
        } else {
            0.0
        }
    }

    /// Processed history covering the last `duration_ms`
    pub fn signal_block(&self, duration_ms: u32) -> SpikerResult<Vec<i32>> {
        self.buffer.window(duration_ms)
    }

    /// Processed history over the default window (`max_window_ms`, 3000 ms)
    pub fn signal_block_default(&self) -> Vec<i32> {
        // The configured maximum is always inside the buffer's range
        self.buffer
            .window(self.config.max_window_ms)
            .unwrap_or_default()
    }

    /// Unfiltered ECG history covering the last `duration_ms`
    pub fn raw_block(&self, duration_ms: u32) -> SpikerResult<Vec<i32>> {
        self.raw_history.window(duration_ms)
    }

    /// Largest processed sample in the last `duration_ms`, 0 if none
    pub fn max_signal_in_last(&self, duration_ms: u32) -> SpikerResult<i32> {
        self.buffer.max_in_last(duration_ms)
    }

    /// Hysteresis-confirmed peaks in the last `duration_ms`
    pub fn peaks_in_last(&self, duration_ms: u32) -> SpikerResult<usize> {
        let window = self.buffer.window(duration_ms)?;
        Ok(self.peak_counter.count(&window))
    }

    fn latest_in(&self, mode: Mode) -> i32 {
        if self.mode() == Some(mode) {
            self.buffer.latest().unwrap_or(0)
        } else {
            0
        }
    }

    fn drive_indicator(&mut self, first: bool, second: bool) {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_levels(first, second);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spiker_core::{LatchedIndicator, ManualClock, ReplaySource, SpikerError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn front_end(samples: Vec<i32>) -> (FrontEnd<ReplaySource, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let front_end = FrontEnd::new(
            FrontEndConfig::default(),
            ReplaySource::new(samples),
            clock.clone(),
        )
        .unwrap();
        (front_end, clock)
    }

    fn run(front_end: &mut FrontEnd<ReplaySource, ManualClock>, clock: &ManualClock, ticks: usize) {
        for _ in 0..ticks {
            clock.advance(4);
            front_end.tick();
        }
    }

    /// Baseline 512 with a three-sample spike every `period` samples
    fn spike_train(period: usize) -> Vec<i32> {
        let mut samples = vec![512; period];
        samples[..3].copy_from_slice(&[1000, 1000, 1000]);
        samples
    }

    #[test]
    fn test_idle_tick_reads_nothing() {
        let (mut front_end, _) = front_end(vec![700]);
        assert!(front_end.tick().is_none());
        assert_eq!(front_end.buffered_samples(), 0);
        assert_eq!(front_end.mode(), None);
    }

    #[test]
    fn test_loop_activates_once() {
        let (mut front_end, _) = front_end(vec![700]);
        assert!(front_end.start_muscle_recording());
        assert!(!front_end.start_heart_recording());
        assert!(!front_end.start_brain_recording());
        assert_eq!(front_end.state(), LoopState::Running(Mode::Brain));
    }

    #[test]
    fn test_muscle_envelope_decays_to_zero() {
        let mut samples = vec![700];
        samples.extend(std::iter::repeat(500).take(99));
        let (mut front_end, clock) = front_end(samples);
        front_end.start_muscle_recording();

        run(&mut front_end, &clock, 1);
        assert_eq!(front_end.muscle_power_signal(), 118);

        let mut previous = 118;
        for _ in 0..80 {
            let report = front_end.tick().unwrap();
            assert_eq!(report.stored, (previous - 2).max(0));
            previous = report.stored;
        }
        assert_eq!(front_end.muscle_power_signal(), 0);
        assert_eq!(front_end.latest_sample(), Some(0));
    }

    #[test]
    fn test_heart_mode_detects_regular_beats() {
        let (mut front_end, clock) = front_end(spike_train(200));
        let beats = Arc::new(AtomicUsize::new(0));
        let counter = beats.clone();
        front_end.on_heart_beat(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        front_end.start_heart_recording();
        run(&mut front_end, &clock, 200 * 12);

        // one spike every 800ms
        assert_eq!(beats.load(Ordering::SeqCst), 12);
        assert_eq!(front_end.heart_rate(), 75);
        assert_eq!(front_end.beat_timestamps().len(), 3);
        assert_eq!(front_end.raw_block(3000).unwrap().len(), 750);
    }

    #[test]
    fn test_filter_startup_transient_counts_one_beat() {
        // Fresh filters see a step from zero history to mid-scale
        let (mut front_end, clock) = front_end(vec![512]);

        for _ in 0..2 {
            front_end.start_heart_recording();
            let mut beats = 0;
            let mut peak = 0;
            for _ in 0..2500 {
                clock.advance(4);
                let report = front_end.tick().unwrap();
                peak = peak.max(report.stored.abs());
                if report.beat {
                    beats += 1;
                }
            }
            assert_eq!(beats, 1);
            assert!(peak > 70);
            assert_eq!(front_end.heart_signal(), 0);
        }
    }

    #[test]
    fn test_subscriber_is_replaced_wholesale() {
        let (mut front_end, clock) = front_end(spike_train(200));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let handle = first.clone();
        front_end.on_heart_beat(Box::new(move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        }));
        let handle = second.clone();
        front_end.on_heart_beat(Box::new(move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        }));

        front_end.start_heart_recording();
        run(&mut front_end, &clock, 400);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert!(second.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_beat_reports_match_subscriber_calls() {
        let (mut front_end, clock) = front_end(spike_train(150));
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = calls.clone();
        front_end.on_heart_beat(Box::new(move |event| {
            assert!(event.timestamp_ms > 0);
            handle.fetch_add(1, Ordering::SeqCst);
        }));
        front_end.start_heart_recording();

        let mut reported = 0;
        for _ in 0..1500 {
            clock.advance(4);
            if front_end.tick().map_or(false, |r| r.beat) {
                reported += 1;
            }
        }
        assert_eq!(reported, calls.load(Ordering::SeqCst));
    }

    #[test]
    fn test_brain_mode_at_mid_scale() {
        let (mut front_end, clock) = front_end(vec![512]);
        front_end.start_brain_recording();
        for _ in 0..2000 {
            clock.advance(4);
            front_end.tick();
            assert_eq!(front_end.brain_alpha_power(), 0.0);
        }
        assert_eq!(front_end.brain_signal(), 512);
        assert_eq!(front_end.signal_block(40).unwrap(), vec![512; 10]);
    }

    #[test]
    fn test_metrics_are_mode_gated() {
        let (mut front_end, clock) = front_end(spike_train(200));
        front_end.start_heart_recording();
        run(&mut front_end, &clock, 2000);
        assert!(front_end.heart_rate() > 0);

        front_end.start_muscle_recording();
        assert_eq!(front_end.heart_rate(), 0);
        assert_eq!(front_end.heart_signal(), 0);
        assert_eq!(front_end.brain_signal(), 0);
        assert_eq!(front_end.brain_alpha_power(), 0.0);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let (mut front_end, clock) = front_end(vec![512]);
        front_end.start_brain_recording();
        run(&mut front_end, &clock, 1000);
        assert_eq!(front_end.buffered_samples(), 750);
        assert_eq!(front_end.signal_block(3000).unwrap().len(), 750);
    }

    #[test]
    fn test_default_block_spans_full_buffer() {
        let (mut front_end, clock) = front_end(vec![512, 600, 700]);
        front_end.start_brain_recording();
        assert!(front_end.signal_block_default().is_empty());

        run(&mut front_end, &clock, 900);
        let block = front_end.signal_block_default();
        assert_eq!(block.len(), 750);
        assert_eq!(block, front_end.signal_block(3000).unwrap());
        assert_eq!(block.last().copied(), front_end.latest_sample());
    }

    #[test]
    fn test_restart_clears_history() {
        let (mut front_end, clock) = front_end(vec![800]);
        front_end.start_muscle_recording();
        run(&mut front_end, &clock, 50);
        assert!(front_end.muscle_power_signal() > 0);

        front_end.start_muscle_recording();
        assert_eq!(front_end.buffered_samples(), 0);
        assert_eq!(front_end.muscle_power_signal(), 0);
    }

    #[test]
    fn test_stop_clears_but_keeps_ticking() {
        let (mut front_end, clock) = front_end(vec![800]);
        front_end.start_muscle_recording();
        run(&mut front_end, &clock, 50);
        let session = front_end.session().map(|s| s.id);
        assert!(session.is_some());

        front_end.stop_recording();
        assert_eq!(front_end.buffered_samples(), 0);
        assert_eq!(front_end.muscle_power_signal(), 0);
        assert!(front_end.session().is_none());

        let report = front_end.tick().unwrap();
        assert_eq!(report.mode, Mode::Muscle);
        assert_eq!(front_end.buffered_samples(), 1);
    }

    #[test]
    fn test_window_queries() {
        let (mut front_end, clock) = front_end(vec![800]);
        front_end.start_muscle_recording();
        run(&mut front_end, &clock, 100);

        assert!(front_end.signal_block(0).unwrap().is_empty());
        assert_eq!(front_end.max_signal_in_last(0).unwrap(), 0);
        assert_eq!(front_end.peaks_in_last(0).unwrap(), 0);
        assert_eq!(front_end.max_signal_in_last(3000).unwrap(), 218);
        for duration in [1, 4, 100, 399, 2999, 3000] {
            let block = front_end.signal_block(duration).unwrap();
            assert!(block.len() <= (duration / 4) as usize);
            assert!(block.len() <= front_end.buffered_samples());
        }
        assert!(matches!(
            front_end.signal_block(3001),
            Err(SpikerError::WindowOutOfRange { .. })
        ));
        assert!(front_end.peaks_in_last(10_000).is_err());
    }

    #[test]
    fn test_peaks_in_muscle_bursts() {
        // three bursts, each followed by enough rest for the envelope to fall
        let mut samples = Vec::new();
        for _ in 0..3 {
            samples.extend(std::iter::repeat(800).take(10));
            samples.extend(std::iter::repeat(500).take(140));
        }
        let (mut front_end, clock) = front_end(samples);
        front_end.start_muscle_recording();
        run(&mut front_end, &clock, 450);
        assert_eq!(front_end.peaks_in_last(3000).unwrap(), 3);
    }

    #[test]
    fn test_indicator_follows_mode() {
        let indicator = LatchedIndicator::new();
        let (front_end, _) = front_end(vec![512]);
        let mut front_end = front_end.with_indicator(Box::new(indicator.clone()));

        front_end.start_heart_recording();
        assert_eq!(indicator.levels(), (true, false));
        front_end.start_brain_recording();
        assert_eq!(indicator.levels(), (false, true));
        front_end.stop_recording();
        assert_eq!(indicator.levels(), (false, false));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = FrontEndConfig {
            buffer_capacity: 0,
            ..FrontEndConfig::default()
        };
        let result = FrontEnd::new(config, ReplaySource::constant(0), ManualClock::new(0));
        assert!(result.is_err());
    }
}
