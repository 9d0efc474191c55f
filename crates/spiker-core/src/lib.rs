//! Spiker-Core: Foundation types for the single-channel biosignal front end
//!
//! Mode selection, recording sessions, error types and the external
//! capabilities (analog input, clock, digital outputs, value output)
//! the processing core is written against.

pub mod signal_types;
pub mod session;
pub mod io;
pub mod error;

pub use signal_types::*;
pub use session::RecordingSession;
pub use io::*;
pub use error::{SpikerError, SpikerResult};
