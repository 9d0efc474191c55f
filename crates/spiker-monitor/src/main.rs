//! Headless biosignal monitor
//!
//! Runs the acquisition loop on a simulated source and prints the
//! mode's derived metric once per second.
//!
//! Usage: `spiker-monitor [MODE] [SECONDS] [CONFIG]`

mod cli;
mod console;

use clap::Parser;
use cli::Cli;
use console::{derived_metric, ConsoleSink};
use spiker_core::{print, BeatEvent, Mode};
use spiker_simulation::{SamplingDriver, SimulatorConfig};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.front_end_config()?;
    let (mode, seconds) = (cli.mode, cli.seconds);

    info!(%mode, seconds, "starting {} monitor", mode.modality());

    let mut driver = SamplingDriver::simulated(config, SimulatorConfig::for_mode(mode))?;

    if mode == Mode::Heart {
        driver
            .on_heart_beat(Box::new(|beat: &BeatEvent| {
                info!(timestamp_ms = beat.timestamp_ms, bpm = beat.bpm, "heartbeat");
            }))
            .await;
    }

    driver.start_recording(mode).await;

    let mut sink = ConsoleSink::stdout();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // First tick completes immediately
    ticker.tick().await;

    for _ in 0..seconds {
        ticker.tick().await;
        let value = driver.query(|front_end| derived_metric(front_end, mode)).await;
        print(&mut sink, value);
    }

    driver.stop_recording().await;
    driver.shutdown();
    info!("monitor stopped");

    Ok(())
}
