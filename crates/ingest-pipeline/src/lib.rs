//! Launch description emission for capture sources.
//!
//! This crate serializes a compiled [`RoutingPlan`](ingest_routing::RoutingPlan)
//! into the textual graph description consumed by the pipeline execution
//! engine, and names the points other pipelines attach to.

mod description;
mod emitter;
mod names;

pub use description::{Chain, Element, PipelineDescription};
pub use emitter::{DeviceSettings, DuplicationPoint, EmitterOptions, PlanEmitter, StreamPoints};
pub use names::{
    audio_output_name, duplication_name, interleave_name, queue_name, video_output_name, Side,
};

/// Element factory delivering the device's video.
pub const VIDEO_SOURCE_ELEMENT: &str = "decklinkvideosrc";

/// Element factory delivering the device's raw audio channels.
pub const AUDIO_SOURCE_ELEMENT: &str = "decklinkaudiosrc";

/// Default video mode of a capture device.
pub const DEFAULT_VIDEO_MODE: &str = "1080i50";

/// Connection and format value letting the device choose.
pub const AUTO: &str = "auto";
