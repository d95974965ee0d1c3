//! Events published by a source controller.

use serde::{Deserialize, Serialize};

use ingest_routing::RoutingPlan;

use crate::state::SourceState;

/// Events a source controller publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceEvent {
    /// Source state has changed.
    StateChanged {
        /// Previous state.
        previous: Box<SourceState>,

        /// Current state.
        current: Box<SourceState>,
    },

    /// A routing plan was compiled for the source.
    PlanCompiled {
        /// Source name.
        source: String,

        /// The new plan.
        plan: RoutingPlan,
    },

    /// Reply to [`SourceCommand::GetPlan`](crate::SourceCommand::GetPlan).
    Plan(Option<RoutingPlan>),

    /// Reply to [`SourceCommand::GetState`](crate::SourceCommand::GetState).
    State(SourceState),

    /// A command failed.
    Error {
        /// Error message.
        message: String,
    },

    /// Controller loop is running.
    Ready,

    /// Controller loop has ended.
    Shutdown,
}
