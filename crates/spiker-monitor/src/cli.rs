use anyhow::Context;
use clap::Parser;
use spiker_core::Mode;
use spiker_processing::FrontEndConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spiker-monitor",
    version,
    about = "Headless single-channel biosignal monitor",
    long_about = "Samples a simulated analog input at 250 Hz through the muscle, heart or \
                  brain pipeline and prints the derived metric once per second."
)]
pub struct Cli {
    /// Recording mode (muscle/emg, heart/ecg, brain/eeg)
    #[arg(default_value_t = Mode::Muscle)]
    pub mode: Mode,

    /// How long to run, in seconds
    #[arg(default_value_t = 10)]
    pub seconds: u64,

    /// Front end configuration as JSON
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load the configuration file, or the defaults when none was given
    pub fn front_end_config(&self) -> anyhow::Result<FrontEndConfig> {
        match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Ok(FrontEndConfig::from_json(&json)?)
            }
            None => Ok(FrontEndConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["spiker-monitor"]).unwrap();
        assert_eq!(cli.mode, Mode::Muscle);
        assert_eq!(cli.seconds, 10);
        assert!(cli.config.is_none());
        assert_eq!(cli.front_end_config().unwrap(), FrontEndConfig::default());
    }

    #[test]
    fn test_mode_aliases_and_duration() {
        let cli = Cli::try_parse_from(["spiker-monitor", "ecg", "30", "front_end.json"]).unwrap();
        assert_eq!(cli.mode, Mode::Heart);
        assert_eq!(cli.seconds, 30);
        assert_eq!(cli.config, Some(PathBuf::from("front_end.json")));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["spiker-monitor", "lungs"]).is_err());
        assert!(Cli::try_parse_from(["spiker-monitor", "brain", "-5"]).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["spiker-monitor", "brain", "1", "/nonexistent/spiker.json"])
            .unwrap();
        assert!(cli.front_end_config().is_err());
    }
}
