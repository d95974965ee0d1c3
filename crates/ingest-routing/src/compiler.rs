//! Routing graph compilation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::bounds::validate_bounds;
use crate::error::RoutingError;
use crate::mapping::{ChannelRef, ChannelSelection, StreamMapping};
use crate::tier::{plan_tier, ChannelTier};
use crate::RoutingResult;

/// How an output stream is derived from the raw device channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Two independent channels wired straight to the interleave inputs.
    DirectPair { left: ChannelRef, right: ChannelRef },

    /// One channel fanned out through a duplication point to both inputs.
    DuplicatedMono { channel: ChannelRef },
}

/// Routing for a single output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Output stream produced by this rule's interleave point.
    pub output_stream: u32,

    /// Topology feeding the interleave point.
    pub kind: RuleKind,
}

impl RoutingRule {
    /// Raw channels feeding the left and right interleave inputs.
    pub fn inputs(&self) -> (ChannelRef, ChannelRef) {
        match self.kind {
            RuleKind::DirectPair { left, right } => (left, right),
            RuleKind::DuplicatedMono { channel } => (channel, channel),
        }
    }

    /// True when the rule needs a duplication point.
    pub fn is_duplicated(&self) -> bool {
        matches!(self.kind, RuleKind::DuplicatedMono { .. })
    }
}

/// Validated routing of one capture source.
///
/// Built in one piece by [`compile_plan`] and never modified afterwards.
/// Deserialized plans are checked against the same invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoutingPlan")]
pub struct RoutingPlan {
    rules: Vec<RoutingRule>,
    tier: ChannelTier,
    fallback: bool,
}

impl RoutingPlan {
    /// Rules in mapping declaration order.
    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    /// Device channel tier needed for every referenced channel.
    pub fn tier(&self) -> ChannelTier {
        self.tier
    }

    /// Channel count to request from the device.
    pub fn required_input_channels(&self) -> u32 {
        self.tier.channels()
    }

    /// True when no mapping was configured and stream 0 is fed from raw channels 0 and 1.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Number of output audio streams the source provides.
    pub fn audio_stream_count(&self) -> usize {
        if self.fallback {
            1
        } else {
            self.rules.len()
        }
    }

    /// Rule producing the given output stream.
    pub fn rule_for(&self, output_stream: u32) -> Option<&RoutingRule> {
        self.rules
            .iter()
            .find(|rule| rule.output_stream == output_stream)
    }

    /// Output streams the plan provides, in rule order.
    pub fn output_streams(&self) -> Vec<u32> {
        if self.fallback {
            vec![0]
        } else {
            self.rules.iter().map(|rule| rule.output_stream).collect()
        }
    }

    /// True when the plan provides the given output stream.
    pub fn provides_stream(&self, output_stream: u32) -> bool {
        if self.fallback {
            output_stream == 0
        } else {
            self.rule_for(output_stream).is_some()
        }
    }
}

#[derive(Deserialize)]
struct RawRoutingPlan {
    rules: Vec<RoutingRule>,
    tier: ChannelTier,
    fallback: bool,
}

impl TryFrom<RawRoutingPlan> for RoutingPlan {
    type Error = RoutingError;

    fn try_from(raw: RawRoutingPlan) -> RoutingResult<Self> {
        let inconsistent = |reason: String| RoutingError::InconsistentPlan { reason };

        if raw.fallback != raw.rules.is_empty() {
            return Err(inconsistent(format!(
                "fallback is {} with {} rules",
                raw.fallback,
                raw.rules.len()
            )));
        }

        for (i, rule) in raw.rules.iter().enumerate() {
            if raw.rules[..i]
                .iter()
                .any(|earlier| earlier.output_stream == rule.output_stream)
            {
                return Err(inconsistent(format!(
                    "output stream {} is routed twice",
                    rule.output_stream
                )));
            }
        }

        let required = raw
            .rules
            .iter()
            .map(|rule| {
                let (left, right) = rule.inputs();
                left.max(right).saturating_add(1)
            })
            .max()
            .unwrap_or(0);
        let tier = ChannelTier::for_channel_count(required)?;
        if tier != raw.tier {
            return Err(inconsistent(format!(
                "tier of {} does not match {required} referenced channels",
                raw.tier
            )));
        }

        Ok(Self {
            rules: raw.rules,
            tier,
            fallback: raw.fallback,
        })
    }
}

/// Turn a validated mapping into one rule per mapped stream, in declaration order.
pub fn compile_rules(mapping: &StreamMapping) -> Vec<RoutingRule> {
    mapping
        .iter()
        .map(|entry| {
            let kind = match entry.selection {
                ChannelSelection::Pair { left, right } => RuleKind::DirectPair { left, right },
                ChannelSelection::Single(channel) => RuleKind::DuplicatedMono { channel },
            };
            RoutingRule {
                output_stream: entry.output_stream,
                kind,
            }
        })
        .collect()
}

/// Validate a mapping against the mix and compile it into a routing plan.
///
/// Checks stream bounds first, then resolves the channel tier, then compiles
/// the rules. Nothing is compiled when either check fails.
#[instrument(name = "compile_plan", skip(mapping), fields(streams = mapping.len()))]
pub fn compile_plan(mapping: &StreamMapping, enabled_streams: u32) -> RoutingResult<RoutingPlan> {
    validate_bounds(mapping, enabled_streams)?;
    let tier = plan_tier(mapping)?;

    let fallback = mapping.is_empty();
    if fallback {
        info!("No audio stream mapping defined, mapping channels 0+1 to stream 0");
    }

    let rules = compile_rules(mapping);
    for rule in &rules {
        match rule.kind {
            RuleKind::DirectPair { left, right } => info!(
                output_stream = rule.output_stream,
                left,
                right,
                "Mapping input channels as left and right"
            ),
            RuleKind::DuplicatedMono { channel } => info!(
                output_stream = rule.output_stream,
                channel,
                "Mapping input channel to both left and right"
            ),
        }
    }

    debug!(%tier, rules = rules.len(), "Routing plan compiled");

    Ok(RoutingPlan {
        rules,
        tier,
        fallback,
    })
}
