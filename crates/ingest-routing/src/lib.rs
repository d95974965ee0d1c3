//! Audio routing planner for multi-channel capture devices.
//!
//! This crate turns the sparse `audiostream[<N>]` entries of a capture
//! source's configuration into an explicit routing plan: which raw device
//! channels feed the left and right inputs of every output stream, and how
//! many channels the device has to be configured for.
//!
//! Planning runs in four steps, all synchronous and side-effect free:
//!
//! 1. [`StreamMapping::parse`] decodes the configuration entries.
//! 2. [`validate_bounds`] rejects streams the mix does not enable.
//! 3. [`plan_tier`] rounds the highest referenced channel up to a [`ChannelTier`].
//! 4. [`compile_rules`] produces one [`RoutingRule`] per mapped stream.
//!
//! [`compile_plan`] runs steps 2-4 and returns the finished [`RoutingPlan`].

mod bounds;
mod compiler;
mod error;
mod mapping;
mod tier;

pub use bounds::validate_bounds;
pub use compiler::{compile_plan, compile_rules, RoutingPlan, RoutingRule, RuleKind};
pub use error::RoutingError;
pub use mapping::{ChannelRef, ChannelSelection, StreamMapping, StreamMappingEntry};
pub use tier::{max_referenced, plan_tier, ChannelTier};

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Channel count a capture device delivers when nothing else is requested.
pub const DEFAULT_INPUT_CHANNELS: u32 = 2;

/// Largest channel count any supported capture device can be configured for.
pub const MAX_INPUT_CHANNELS: u32 = 16;

/// Prefix of configuration keys that carry an audio stream mapping.
pub const AUDIOSTREAM_KEY_PREFIX: &str = "audiostream[";
