//! Configuration snapshot and typed messages for capture sources.
//!
//! This crate defines the immutable configuration handed to a source at
//! construction and the command/event types exchanged with a running
//! source controller.

mod commands;
mod events;
mod state;
mod types;

pub use commands::SourceCommand;
pub use events::SourceEvent;
pub use state::SourceState;
pub use types::{ConfigSection, ConfigSnapshot};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (caller → controller).
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Channel capacity for events (controller → caller).
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<SourceCommand>, Receiver<SourceCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<SourceEvent>, Receiver<SourceEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
