//! Capture source lifecycle.
//!
//! This crate ties routing, pipeline emission and the execution engine
//! together: a [`DecklinkSource`] reads its settings from a configuration
//! snapshot, compiles a routing plan, renders the launch description and
//! hands it to a [`PipelineRunner`]. A [`SourceController`] drives one
//! source from a command channel.

mod controller;
mod error;
mod runner;
mod settings;
mod source;

pub use controller::SourceController;
pub use error::{RunnerError, SourceError};
pub use runner::{DryRunRunner, EngineVersion, PipelineRunner};
pub use settings::{device_settings, MixSettings, DEFAULT_AUDIO_STREAMS, MIX_SECTION};
pub use source::DecklinkSource;

use ingest_ipc::{SourceCommand, SourceEvent};
use crossbeam_channel::{Receiver, Sender};

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Oldest engine known to capture more than two channels correctly.
pub const MIN_MULTICHANNEL_ENGINE_VERSION: EngineVersion = EngineVersion::new(1, 12, 3);

/// Create a controller for `source` with IPC channels.
pub fn create_controller<R: PipelineRunner>(
    source: DecklinkSource<R>,
    command_rx: Receiver<SourceCommand>,
    event_tx: Sender<SourceEvent>,
) -> SourceController<R> {
    SourceController::new(source, command_rx, event_tx)
}
