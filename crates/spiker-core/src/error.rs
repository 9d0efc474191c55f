//! Error handling for the Spiker front end
//!
//! A single error type shared by every crate in the workspace.

use core::fmt;

/// Result type alias for front end operations
pub type SpikerResult<T> = Result<T, SpikerError>;

/// Error type for all front end operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SpikerError {
    /// Invalid front end configuration
    ConfigurationError {
        /// Description of the configuration error
        message: String,
    },

    /// Filter parameters outside the designable range
    InvalidFilterDesign {
        /// Description of the design issue
        reason: &'static str,
        /// Offending frequency in Hz
        frequency: f64,
        /// Sampling rate the design was requested for
        sampling_rate: f64,
    },

    /// Requested window is outside the queryable range
    WindowOutOfRange {
        /// Requested duration in milliseconds
        requested_ms: u32,
        /// Largest accepted duration in milliseconds
        max_ms: u32,
    },

    /// Synthetic signal generation failed
    SimulationError {
        /// Simulation error description
        message: String,
    },

    /// Sampling driver failure
    DriverError {
        /// Driver error description
        message: String,
    },
}

impl fmt::Display for SpikerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpikerError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            SpikerError::InvalidFilterDesign { reason, frequency, sampling_rate } => {
                write!(f, "Invalid filter design: {} ({}Hz at {}Hz sampling)",
                       reason, frequency, sampling_rate)
            }
            SpikerError::WindowOutOfRange { requested_ms, max_ms } => {
                write!(f, "Window out of range: requested {}ms, allowed 0..={}ms",
                       requested_ms, max_ms)
            }
            SpikerError::SimulationError { message } => {
                write!(f, "Simulation error: {}", message)
            }
            SpikerError::DriverError { message } => {
                write!(f, "Driver error: {}", message)
            }
        }
    }
}

impl std::error::Error for SpikerError {}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)+) => {
        $crate::error::SpikerError::ConfigurationError {
            message: format!($($arg)+),
        }
    };
}
