//! Routing plan to launch description emission.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ingest_routing::{ChannelTier, RoutingPlan, RoutingRule, RuleKind};

use crate::description::{Chain, Element, PipelineDescription};
use crate::names::{
    audio_output_name, duplication_name, interleave_name, queue_name, video_output_name, Side,
};
use crate::{AUDIO_SOURCE_ELEMENT, AUTO, DEFAULT_VIDEO_MODE, VIDEO_SOURCE_ELEMENT};

/// Physical parameters of the capture device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Index of the capture card.
    pub device_number: u32,

    /// Audio input connection type.
    pub audio_connection: String,

    /// Video input connection type.
    pub video_connection: String,

    /// Capture timing mode.
    pub video_mode: String,

    /// Pixel format.
    pub video_format: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_number: 0,
            audio_connection: AUTO.to_string(),
            video_connection: AUTO.to_string(),
            video_mode: DEFAULT_VIDEO_MODE.to_string(),
            video_format: AUTO.to_string(),
        }
    }
}

/// Which halves of the source to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterOptions {
    /// Emit the audio routing.
    pub has_audio: bool,

    /// Emit the video conversion chain. The device's video element is always
    /// present; without video it drains into a fakesink.
    pub has_video: bool,

    /// Deinterlacer fragment placed in front of the video conversion chain.
    pub deinterlacer: Option<String>,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            has_audio: true,
            has_video: true,
            deinterlacer: None,
        }
    }
}

/// Duplication point splitting one raw channel in two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationPoint {
    /// Element name.
    pub name: String,

    /// Raw channel pad feeding it.
    pub input: String,
}

/// Named points making up one output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamPoints {
    /// Output stream index.
    pub output_stream: u32,

    /// Present for mono-duplicated streams only.
    pub duplication: Option<DuplicationPoint>,

    /// Interleave element name.
    pub interleave: String,

    /// Pad feeding the left interleave input.
    pub left_input: String,

    /// Pad feeding the right interleave input.
    pub right_input: String,
}

impl StreamPoints {
    fn input(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_input,
            Side::Right => &self.right_input,
        }
    }
}

/// Emits the launch description of one capture source.
pub struct PlanEmitter<'a> {
    source: &'a str,
    device: &'a DeviceSettings,
    plan: &'a RoutingPlan,
    options: &'a EmitterOptions,
}

impl<'a> PlanEmitter<'a> {
    /// Create an emitter for the named source.
    pub fn new(
        source: &'a str,
        device: &'a DeviceSettings,
        plan: &'a RoutingPlan,
        options: &'a EmitterOptions,
    ) -> Self {
        Self {
            source,
            device,
            plan,
            options,
        }
    }

    /// Device tier the plan needs.
    pub fn tier(&self) -> ChannelTier {
        self.plan.tier()
    }

    /// Channel count for the device configuration.
    pub fn required_input_channels(&self) -> u32 {
        self.plan.required_input_channels()
    }

    /// Named points for every routed output stream, in plan order.
    ///
    /// Empty in fallback mode, where the raw device output is the stream.
    pub fn stream_points(&self) -> Vec<StreamPoints> {
        self.plan
            .rules()
            .iter()
            .map(|rule| self.points_for(rule))
            .collect()
    }

    fn points_for(&self, rule: &RoutingRule) -> StreamPoints {
        let stream = rule.output_stream;
        let aout = audio_output_name(self.source);

        match rule.kind {
            RuleKind::DirectPair { left, right } => StreamPoints {
                output_stream: stream,
                duplication: None,
                interleave: interleave_name(self.source, stream),
                left_input: format!("{aout}.src_{left}"),
                right_input: format!("{aout}.src_{right}"),
            },
            RuleKind::DuplicatedMono { channel } => {
                let tee = duplication_name(self.source, stream);
                StreamPoints {
                    output_stream: stream,
                    duplication: Some(DuplicationPoint {
                        name: tee.clone(),
                        input: format!("{aout}.src_{channel}"),
                    }),
                    interleave: interleave_name(self.source, stream),
                    left_input: format!("{tee}."),
                    right_input: format!("{tee}."),
                }
            }
        }
    }

    /// Pad other pipelines read the given output stream from.
    pub fn audio_port(&self, output_stream: u32) -> Option<String> {
        if !self.options.has_audio || !self.plan.provides_stream(output_stream) {
            return None;
        }

        if self.plan.is_fallback() {
            Some(format!("{}.", audio_output_name(self.source)))
        } else {
            Some(format!("{}.", interleave_name(self.source, output_stream)))
        }
    }

    /// Pad other pipelines read the video from.
    pub fn video_port(&self) -> Option<String> {
        self.options
            .has_video
            .then(|| format!("{}.", video_output_name(self.source)))
    }

    /// Render the complete launch description.
    pub fn emit(&self) -> PipelineDescription {
        let mut description = PipelineDescription::new();
        description.push(self.video_chain());

        if self.options.has_audio {
            description.push(self.audio_source_chain());

            for points in self.stream_points() {
                description.push(Chain::from_element(
                    Element::new("interleave").named(&points.interleave),
                ));

                if let Some(duplication) = &points.duplication {
                    description.push(
                        Chain::from_pad(duplication.input.as_str())
                            .then(Element::new("tee").named(&duplication.name)),
                    );
                }

                for side in [Side::Left, Side::Right] {
                    description.push(
                        Chain::from_pad(points.input(side))
                            .then(
                                Element::new("queue").named(queue_name(
                                    self.source,
                                    points.output_stream,
                                    side,
                                )),
                            )
                            .then_pad(format!("{}.sink_{}", points.interleave, side.sink_index())),
                    );
                }
            }
        }

        debug!(
            source = self.source,
            blocks = description.blocks().len(),
            "Emitted launch description"
        );

        description
    }

    fn video_chain(&self) -> Chain {
        let source = Element::new(VIDEO_SOURCE_ELEMENT)
            .property("device-number", self.device.device_number)
            .property("connection", &self.device.video_connection)
            .property("video-format", &self.device.video_format)
            .property("mode", &self.device.video_mode);
        let chain = Chain::from_element(source);

        if !self.options.has_video {
            return chain.then(Element::new("fakesink"));
        }

        chain
            .then_fragment(self.options.deinterlacer.as_deref().unwrap_or_default())
            .then(Element::new("videoconvert"))
            .then(Element::new("videoscale"))
            .then(Element::new("videorate").named(video_output_name(self.source)))
    }

    fn audio_source_chain(&self) -> Chain {
        let tier = self.plan.tier();
        let mut source = Element::new(AUDIO_SOURCE_ELEMENT);
        if tier.is_multichannel() {
            source = source.property("channels", tier.channels());
        }
        source = source
            .property("device-number", self.device.device_number)
            .property("connection", &self.device.audio_connection);

        let aout = audio_output_name(self.source);
        if self.plan.is_fallback() {
            Chain::from_element(source.named(aout))
        } else {
            Chain::from_element(source).then(Element::new("deinterleave").named(aout))
        }
    }
}
