//! Device channel-count tier planning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::mapping::StreamMapping;
use crate::{RoutingResult, DEFAULT_INPUT_CHANNELS, MAX_INPUT_CHANNELS};

/// Channel-count configurations supported by the capture hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum ChannelTier {
    /// Stereo, the device default.
    #[default]
    Two,

    /// Eight discrete channels.
    Eight,

    /// Sixteen discrete channels.
    Sixteen,
}

impl ChannelTier {
    /// Smallest tier that delivers at least `required` channels.
    pub fn for_channel_count(required: u32) -> RoutingResult<Self> {
        match required {
            0..=DEFAULT_INPUT_CHANNELS => Ok(Self::Two),
            3..=8 => Ok(Self::Eight),
            9..=MAX_INPUT_CHANNELS => Ok(Self::Sixteen),
            requested => Err(RoutingError::ChannelCapacityExceeded { requested }),
        }
    }

    /// Number of channels the device delivers in this tier.
    pub fn channels(self) -> u32 {
        match self {
            Self::Two => DEFAULT_INPUT_CHANNELS,
            Self::Eight => 8,
            Self::Sixteen => MAX_INPUT_CHANNELS,
        }
    }

    /// True when the device must be configured explicitly for this tier.
    pub fn is_multichannel(self) -> bool {
        self != Self::Two
    }
}

impl fmt::Display for ChannelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} channels", self.channels())
    }
}

impl From<ChannelTier> for u32 {
    fn from(tier: ChannelTier) -> Self {
        tier.channels()
    }
}

impl TryFrom<u32> for ChannelTier {
    type Error = String;

    fn try_from(channels: u32) -> Result<Self, Self::Error> {
        match channels {
            DEFAULT_INPUT_CHANNELS => Ok(Self::Two),
            8 => Ok(Self::Eight),
            MAX_INPUT_CHANNELS => Ok(Self::Sixteen),
            other => Err(format!("unsupported channel tier: {other}")),
        }
    }
}

/// Number of device channels the mapping needs: highest referenced channel plus one.
///
/// An empty mapping needs none.
pub fn max_referenced(mapping: &StreamMapping) -> u32 {
    mapping
        .iter()
        .map(|entry| entry.selection.highest_channel().saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Resolve the device tier that supplies every channel the mapping references.
pub fn plan_tier(mapping: &StreamMapping) -> RoutingResult<ChannelTier> {
    ChannelTier::for_channel_count(max_referenced(mapping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ChannelSelection;

    fn single(channel: u32) -> StreamMapping {
        let mut mapping = StreamMapping::new();
        mapping.insert(0, ChannelSelection::Single(channel));
        mapping
    }

    #[test]
    fn test_tier_boundaries() {
        let expected = [
            (0, ChannelTier::Two),
            (1, ChannelTier::Two),
            (2, ChannelTier::Two),
            (3, ChannelTier::Eight),
            (8, ChannelTier::Eight),
            (9, ChannelTier::Sixteen),
            (16, ChannelTier::Sixteen),
        ];
        for (required, tier) in expected {
            assert_eq!(ChannelTier::for_channel_count(required), Ok(tier), "{required}");
        }
    }

    #[test]
    fn test_tier_above_sixteen_fails() {
        assert_eq!(
            ChannelTier::for_channel_count(17),
            Err(RoutingError::ChannelCapacityExceeded { requested: 17 })
        );
    }

    #[test]
    fn test_plan_tier_from_referenced_channel() {
        assert_eq!(plan_tier(&single(1)), Ok(ChannelTier::Two));
        assert_eq!(plan_tier(&single(5)), Ok(ChannelTier::Eight));
        assert_eq!(plan_tier(&single(15)), Ok(ChannelTier::Sixteen));
        assert_eq!(
            plan_tier(&single(16)),
            Err(RoutingError::ChannelCapacityExceeded { requested: 17 })
        );
    }

    #[test]
    fn test_pair_uses_highest_side() {
        let mut mapping = StreamMapping::new();
        mapping.insert(0, ChannelSelection::Pair { left: 9, right: 1 });
        assert_eq!(max_referenced(&mapping), 10);
        assert_eq!(plan_tier(&mapping), Ok(ChannelTier::Sixteen));
    }

    #[test]
    fn test_empty_mapping_needs_default_tier() {
        let mapping = StreamMapping::new();
        assert_eq!(max_referenced(&mapping), 0);
        assert_eq!(plan_tier(&mapping), Ok(ChannelTier::Two));
    }

    #[test]
    fn test_max_channel_does_not_overflow() {
        assert_eq!(max_referenced(&single(u32::MAX)), u32::MAX);
        assert!(plan_tier(&single(u32::MAX)).is_err());
    }

    #[test]
    fn test_tier_channel_limits() {
        assert_eq!(ChannelTier::default().channels(), DEFAULT_INPUT_CHANNELS);
        assert_eq!(ChannelTier::Sixteen.channels(), MAX_INPUT_CHANNELS);
        assert_eq!(
            ChannelTier::for_channel_count(DEFAULT_INPUT_CHANNELS),
            Ok(ChannelTier::Two)
        );
        assert!(ChannelTier::for_channel_count(MAX_INPUT_CHANNELS + 1).is_err());
    }

    #[test]
    fn test_multichannel() {
        assert!(!ChannelTier::Two.is_multichannel());
        assert!(ChannelTier::Eight.is_multichannel());
        assert!(ChannelTier::Sixteen.is_multichannel());
    }

    #[test]
    fn test_tier_serializes_as_channel_count() {
        assert_eq!(serde_json::to_string(&ChannelTier::Eight).unwrap(), "8");
        assert_eq!(
            serde_json::from_str::<ChannelTier>("16").unwrap(),
            ChannelTier::Sixteen
        );
        assert!(serde_json::from_str::<ChannelTier>("4").is_err());
    }
}
