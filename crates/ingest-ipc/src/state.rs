//! Source state machine types.

use serde::{Deserialize, Serialize};

/// The current state of a capture source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceState {
    /// Nothing launched yet.
    #[default]
    Idle,

    /// Pipeline launched with a compiled plan.
    Running {
        /// Channels requested from the device.
        input_channels: u32,

        /// Output audio streams provided.
        audio_streams: usize,
    },

    /// Pipeline stopped on request.
    Stopped,

    /// Planning or launching failed.
    Error {
        /// Error message.
        message: String,
    },
}

impl SourceState {
    /// Returns true if nothing has been launched yet.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if the pipeline is running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns true if the pipeline was stopped.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the source is in an error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Stopped => "Stopped",
            Self::Error { .. } => "Error",
        }
    }
}
