//! Real-time sampling driver
//!
//! Ticks a [`FrontEnd`] once per sampling period on a tokio task and
//! broadcasts every tick to subscribers. The task is spawned on the first
//! start call only; later start calls just switch the mode.

use crate::analog_simulator::{AnalogSimulator, SimulatorConfig};
use spiker_core::{
    AnalogSource, Clock, HeartBeatSubscriber, Mode, MonotonicClock, SpikerResult, TickReport,
};
use spiker_processing::{FrontEnd, FrontEndConfig};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{info, trace, warn};

/// Number of tick reports a slow subscriber may lag behind
pub const DEFAULT_REPORT_CAPACITY: usize = 1024;

/// Drives a front end at its sampling rate
pub struct SamplingDriver<S: AnalogSource + 'static, C: Clock + 'static> {
    front_end: Arc<Mutex<FrontEnd<S, C>>>,
    period: Duration,
    report_sender: broadcast::Sender<TickReport>,
    task: Option<JoinHandle<()>>,
}

impl SamplingDriver<AnalogSimulator, MonotonicClock> {
    /// Driver over a simulated input shaped for `mode`
    pub fn simulated(config: FrontEndConfig, simulator: SimulatorConfig) -> SpikerResult<Self> {
        let source = AnalogSimulator::new(simulator)?;
        let front_end = FrontEnd::new(config, source, MonotonicClock::new())?;
        Ok(Self::new(front_end))
    }
}

impl<S: AnalogSource + 'static, C: Clock + 'static> SamplingDriver<S, C> {
    /// Wrap `front_end`; nothing runs until the first start call
    pub fn new(front_end: FrontEnd<S, C>) -> Self {
        let period = Duration::from_micros(front_end.config().sample_period_us());
        let (report_sender, _) = broadcast::channel(DEFAULT_REPORT_CAPACITY);

        SamplingDriver {
            front_end: Arc::new(Mutex::new(front_end)),
            period,
            report_sender,
            task: None,
        }
    }

    /// Get a receiver for tick reports
    pub fn subscribe(&self) -> broadcast::Receiver<TickReport> {
        self.report_sender.subscribe()
    }

    /// Shared handle to the front end for queries
    pub fn front_end(&self) -> Arc<Mutex<FrontEnd<S, C>>> {
        self.front_end.clone()
    }

    /// Run a query against the front end between two ticks
    pub async fn query<R>(&self, f: impl FnOnce(&FrontEnd<S, C>) -> R) -> R {
        let front_end = self.front_end.lock().await;
        f(&front_end)
    }

    pub async fn start_muscle_recording(&mut self) {
        self.start_recording(Mode::Muscle).await
    }

    pub async fn start_heart_recording(&mut self) {
        self.start_recording(Mode::Heart).await
    }

    pub async fn start_brain_recording(&mut self) {
        self.start_recording(Mode::Brain).await
    }

    /// Switch mode; spawns the sampling task on the first activation
    pub async fn start_recording(&mut self, mode: Mode) {
        let first_activation = self.front_end.lock().await.start_recording(mode);

        if first_activation && self.task.is_none() {
            info!(period_us = self.period.as_micros() as u64, "sampling loop started");
            self.task = Some(tokio::spawn(run_sampling_loop(
                self.front_end.clone(),
                self.period,
                self.report_sender.clone(),
            )));
        }
    }

    /// Clear history; sampling continues in the current mode
    pub async fn stop_recording(&self) {
        self.front_end.lock().await.stop_recording();
    }

    /// Register the heartbeat callback; it runs inside the sampling task
    pub async fn on_heart_beat(&self, subscriber: HeartBeatSubscriber) {
        self.front_end.lock().await.on_heart_beat(subscriber);
    }

    /// Whether the sampling task is alive
    pub fn is_sampling(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Abort the sampling task
    pub fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("sampling loop shut down");
        }
    }
}

impl<S: AnalogSource + 'static, C: Clock + 'static> Drop for SamplingDriver<S, C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_sampling_loop<S: AnalogSource, C: Clock>(
    front_end: Arc<Mutex<FrontEnd<S, C>>>,
    period: Duration,
    report_sender: broadcast::Sender<TickReport>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        ticker.tick().await;
        let started = Instant::now();

        // The lock spans the whole tick, so queries only see complete ticks
        let report = front_end.lock().await.tick();

        if let Some(report) = report {
            trace!(mode = %report.mode, raw = report.raw, stored = report.stored, beat = report.beat, "tick");
            // No receivers is fine
            let _ = report_sender.send(report);
        }

        let elapsed = started.elapsed();
        if elapsed > period {
            warn!(
                elapsed_us = elapsed.as_micros() as u64,
                period_us = period.as_micros() as u64,
                "tick overran the sampling period"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analog_simulator::NoiseConfig;
    use spiker_core::{ManualClock, ReplaySource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn simulated(mode: Mode) -> SamplingDriver<AnalogSimulator, MonotonicClock> {
        let simulator = SimulatorConfig {
            noise: NoiseConfig::clean(),
            seed: Some(42),
            ..SimulatorConfig::for_mode(mode)
        };
        SamplingDriver::simulated(FrontEndConfig::default(), simulator).unwrap()
    }

    #[tokio::test]
    async fn test_nothing_runs_before_start() {
        let front_end = FrontEnd::new(
            FrontEndConfig::default(),
            ReplaySource::constant(700),
            ManualClock::new(0),
        )
        .unwrap();
        let driver = SamplingDriver::new(front_end);

        sleep(Duration::from_millis(50)).await;
        assert!(!driver.is_sampling());
        assert_eq!(driver.query(|fe| fe.buffered_samples()).await, 0);
    }

    #[tokio::test]
    async fn test_brain_stream_fills_buffer() {
        let mut driver = simulated(Mode::Brain);
        let mut reports = driver.subscribe();

        driver.start_brain_recording().await;
        sleep(Duration::from_millis(200)).await;

        assert!(driver.is_sampling());
        assert!(driver.query(|fe| fe.buffered_samples()).await > 0);

        let report = reports.recv().await.unwrap();
        assert_eq!(report.mode, Mode::Brain);
        assert_eq!(report.raw, report.stored);

        driver.shutdown();
        assert!(!driver.is_sampling());
    }

    #[tokio::test]
    async fn test_mode_switch_reuses_sampling_task() {
        let mut driver = simulated(Mode::Muscle);
        driver.start_muscle_recording().await;
        sleep(Duration::from_millis(50)).await;

        driver.start_heart_recording().await;
        assert!(driver.is_sampling());
        assert_eq!(driver.query(|fe| fe.mode()).await, Some(Mode::Heart));

        let mut reports = driver.subscribe();
        let report = reports.recv().await.unwrap();
        assert_eq!(report.mode, Mode::Heart);
    }

    #[tokio::test]
    async fn test_stop_keeps_sampling() {
        let mut driver = simulated(Mode::Muscle);
        driver.start_muscle_recording().await;
        sleep(Duration::from_millis(100)).await;

        driver.stop_recording().await;
        sleep(Duration::from_millis(100)).await;

        assert!(driver.is_sampling());
        assert!(driver.query(|fe| fe.buffered_samples()).await > 0);
    }

    #[tokio::test]
    async fn test_heartbeat_subscriber_fires() {
        let mut driver = simulated(Mode::Heart);
        let beats = Arc::new(AtomicUsize::new(0));
        let counter = beats.clone();
        driver
            .on_heart_beat(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .await;

        driver.start_heart_recording().await;
        sleep(Duration::from_millis(1500)).await;

        assert!(beats.load(Ordering::SeqCst) >= 1);
        driver.shutdown();
    }
}
