//! Error types for routing plan construction.

use thiserror::Error;

/// Configuration defects detected while planning audio routing.
///
/// Every variant is fatal: a source whose mapping fails to plan must not be
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// An `audiostream[<N>]` value is neither `<ch>` nor `<left>+<right>`.
    #[error("Malformed audio stream mapping {key} = {value:?} (expected \"<ch>\" or \"<left>+<right>\")")]
    MalformedMapping { key: String, value: String },

    /// A mapping targets an output stream the mix does not enable.
    #[error("Mapping for audio stream {index} found, but only {limit} audio streams are enabled")]
    StreamIndexOutOfRange { index: u32, limit: u32 },

    /// The mapping references more channels than the largest device tier.
    #[error("Capture devices support up to {max} channels, {requested} requested", max = crate::MAX_INPUT_CHANNELS)]
    ChannelCapacityExceeded { requested: u32 },

    /// A decoded plan contradicts what compilation would have produced.
    #[error("Inconsistent routing plan: {reason}")]
    InconsistentPlan { reason: String },
}
