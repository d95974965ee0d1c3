//! Commands sent to a source controller.

use serde::{Deserialize, Serialize};

/// Commands a source controller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceCommand {
    /// Tear the pipeline down and rebuild it from the source's configuration.
    Restart,

    /// Stop the pipeline.
    Stop,

    /// Request the current routing plan.
    GetPlan,

    /// Request the current source state.
    GetState,

    /// Stop the pipeline and end the controller loop.
    Shutdown,
}
