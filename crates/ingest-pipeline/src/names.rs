//! Names of the points a source exposes in its pipeline.
//!
//! Other pipelines link against these names, so they have to stay stable.

use std::fmt;

/// Interleave input a branch feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Interleave sink pad index.
    pub fn sink_index(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Raw audio output of the source, or its deinterleaver when streams are mapped.
pub fn audio_output_name(source: &str) -> String {
    format!("aout-{source}")
}

/// Duplication point of a mono-mapped output stream.
pub fn duplication_name(source: &str, output_stream: u32) -> String {
    format!("t-{source}-{output_stream}")
}

/// Interleave point producing an output stream.
pub fn interleave_name(source: &str, output_stream: u32) -> String {
    format!("i-{source}-{output_stream}")
}

/// Queue on one branch into an interleave point.
pub fn queue_name(source: &str, output_stream: u32, side: Side) -> String {
    format!("queue-decklink-audio-{source}-{output_stream}-{side}")
}

/// Video extraction point of the source.
pub fn video_output_name(source: &str) -> String {
    format!("vout-{source}")
}
