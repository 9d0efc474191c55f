//! Recording session identity

use crate::signal_types::Mode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One continuous recording in a single mode, opened by a start call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSession {
    /// Unique identifier for this session
    pub id: Uuid,
    /// Mode the session records
    pub mode: Mode,
    /// Front end clock reading when the session was opened
    pub started_at_ms: u64,
}

impl RecordingSession {
    /// Open a new session
    pub fn new(mode: Mode, started_at_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            started_at_ms,
        }
    }

    /// Milliseconds elapsed since the session was opened
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }
}
