//! Parsing of `audiostream[<N>]` configuration entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RoutingError;
use crate::{RoutingResult, AUDIOSTREAM_KEY_PREFIX};

/// Index of one physical input channel on the capture device.
pub type ChannelRef = u32;

/// The device channels feeding one output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSelection {
    /// One channel, duplicated to both left and right.
    Single(ChannelRef),

    /// Two channels routed to left and right.
    Pair { left: ChannelRef, right: ChannelRef },
}

impl ChannelSelection {
    /// Parse a mapping value of the form `<ch>` or `<left>+<right>`.
    ///
    /// `key` is only used to name the entry in the error.
    pub fn parse(key: &str, value: &str) -> RoutingResult<Self> {
        let malformed = || RoutingError::MalformedMapping {
            key: key.to_string(),
            value: value.to_string(),
        };

        match value.trim().split_once('+') {
            Some((left, right)) => {
                let left = parse_channel(left).ok_or_else(malformed)?;
                let right = parse_channel(right).ok_or_else(malformed)?;
                Ok(Self::Pair { left, right })
            }
            None => parse_channel(value).map(Self::Single).ok_or_else(malformed),
        }
    }

    /// Highest channel index this selection reads from.
    pub fn highest_channel(&self) -> ChannelRef {
        match *self {
            Self::Single(channel) => channel,
            Self::Pair { left, right } => left.max(right),
        }
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(channel) => write!(f, "{channel}"),
            Self::Pair { left, right } => write!(f, "{left}+{right}"),
        }
    }
}

/// One declared mapping: output stream index and its channel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMappingEntry {
    /// Output stream the selection feeds.
    pub output_stream: u32,

    /// Device channels feeding it.
    pub selection: ChannelSelection,
}

/// Output stream to input channel mapping of one capture source.
///
/// Entries keep their declaration order. Each output stream appears at most
/// once; redeclaring a stream replaces its selection but keeps the position
/// of the first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMapping {
    entries: Vec<StreamMappingEntry>,
}

impl StreamMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from the ordered `(key, value)` entries of a source section.
    ///
    /// Keys other than `audiostream[<N>]` are ignored. The first malformed
    /// value aborts parsing.
    pub fn parse<'a, I>(entries: I) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = Self::new();

        for (key, value) in entries {
            let Some(output_stream) = parse_stream_key(key) else {
                continue;
            };

            let selection = ChannelSelection::parse(key, value)?;
            if let Some(previous) = mapping.insert(output_stream, selection) {
                warn!(
                    output_stream,
                    %previous,
                    current = %selection,
                    "Audio stream mapped more than once, last declaration wins"
                );
            }
        }

        Ok(mapping)
    }

    /// Insert or replace the selection for an output stream.
    ///
    /// Returns the replaced selection, if any.
    pub fn insert(
        &mut self,
        output_stream: u32,
        selection: ChannelSelection,
    ) -> Option<ChannelSelection> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.output_stream == output_stream)
        {
            Some(entry) => Some(std::mem::replace(&mut entry.selection, selection)),
            None => {
                self.entries.push(StreamMappingEntry {
                    output_stream,
                    selection,
                });
                None
            }
        }
    }

    /// Selection for an output stream, if mapped.
    pub fn get(&self, output_stream: u32) -> Option<ChannelSelection> {
        self.entries
            .iter()
            .find(|entry| entry.output_stream == output_stream)
            .map(|entry| entry.selection)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &StreamMappingEntry> {
        self.entries.iter()
    }

    /// Number of mapped output streams.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no stream is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for StreamMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", entry.output_stream, entry.selection)?;
        }
        f.write_str("}")
    }
}

/// Output stream index of an `audiostream[<N>]` key, `None` for any other key.
fn parse_stream_key(key: &str) -> Option<u32> {
    let prefix = key.get(..AUDIOSTREAM_KEY_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(AUDIOSTREAM_KEY_PREFIX) {
        return None;
    }

    let index = key[AUDIOSTREAM_KEY_PREFIX.len()..].strip_suffix(']')?;
    parse_decimal(index)
}

fn parse_channel(text: &str) -> Option<ChannelRef> {
    parse_decimal(text.trim())
}

/// Unsigned decimal without sign or whitespace.
fn parse_decimal(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(entries: &[(&str, &str)]) -> RoutingResult<StreamMapping> {
        StreamMapping::parse(entries.iter().copied())
    }

    #[test]
    fn test_parse_single_channel() {
        assert_eq!(
            ChannelSelection::parse("audiostream[0]", "4"),
            Ok(ChannelSelection::Single(4))
        );
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            ChannelSelection::parse("audiostream[0]", "2+3"),
            Ok(ChannelSelection::Pair { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(
            ChannelSelection::parse("audiostream[0]", " 2 + 3 "),
            Ok(ChannelSelection::Pair { left: 2, right: 3 })
        );
        assert_eq!(
            ChannelSelection::parse("audiostream[0]", "  7\n"),
            Ok(ChannelSelection::Single(7))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for value in ["abc", "", "+", "1+", "+2", "1+2+3", "-1", "1.5", "0x2", "1 2"] {
            let result = ChannelSelection::parse("audiostream[3]", value);
            assert_eq!(
                result,
                Err(RoutingError::MalformedMapping {
                    key: "audiostream[3]".to_string(),
                    value: value.to_string(),
                }),
                "value {value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_channel_overflow() {
        assert!(ChannelSelection::parse("audiostream[0]", "99999999999").is_err());
    }

    #[test]
    fn test_highest_channel() {
        assert_eq!(ChannelSelection::Single(5).highest_channel(), 5);
        assert_eq!(ChannelSelection::Pair { left: 9, right: 2 }.highest_channel(), 9);
    }

    #[test]
    fn test_selection_display() {
        assert_eq!(ChannelSelection::Single(1).to_string(), "1");
        assert_eq!(ChannelSelection::Pair { left: 2, right: 3 }.to_string(), "2+3");
    }

    #[test]
    fn test_stream_key_recognition() {
        assert_eq!(parse_stream_key("audiostream[0]"), Some(0));
        assert_eq!(parse_stream_key("audiostream[12]"), Some(12));
        assert_eq!(parse_stream_key("AudioStream[2]"), Some(2));
        assert_eq!(parse_stream_key("audiostream[]"), None);
        assert_eq!(parse_stream_key("audiostream[a]"), None);
        assert_eq!(parse_stream_key("audiostream[1]x"), None);
        assert_eq!(parse_stream_key("audiostream"), None);
        assert_eq!(parse_stream_key("devicenumber"), None);
        assert_eq!(parse_stream_key("audiostream[99999999999]"), None);
    }

    #[test]
    fn test_mapping_ignores_other_keys() {
        let mapping = parse(&[
            ("devicenumber", "1"),
            ("video_mode", "1080p25"),
            ("audiostream[0]", "2+3"),
            ("kind", "decklink"),
        ])
        .unwrap();

        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get(0),
            Some(ChannelSelection::Pair { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_mapping_keeps_declaration_order() {
        let mapping = parse(&[
            ("audiostream[2]", "5"),
            ("audiostream[0]", "0+1"),
            ("audiostream[1]", "4"),
        ])
        .unwrap();

        let streams: Vec<u32> = mapping.iter().map(|e| e.output_stream).collect();
        assert_eq!(streams, vec![2, 0, 1]);
    }

    #[test]
    fn test_mapping_last_declaration_wins_in_place() {
        let mapping = parse(&[
            ("audiostream[0]", "1"),
            ("audiostream[1]", "2+3"),
            ("audiostream[0]", "6+7"),
        ])
        .unwrap();

        assert_eq!(
            mapping.iter().copied().collect::<Vec<_>>(),
            vec![
                StreamMappingEntry {
                    output_stream: 0,
                    selection: ChannelSelection::Pair { left: 6, right: 7 },
                },
                StreamMappingEntry {
                    output_stream: 1,
                    selection: ChannelSelection::Pair { left: 2, right: 3 },
                },
            ]
        );
    }

    #[test]
    fn test_mapping_empty_section() {
        let mapping = parse(&[]).unwrap();
        assert!(mapping.is_empty());
        assert_eq!(mapping, StreamMapping::new());
    }

    #[test]
    fn test_mapping_malformed_value_aborts() {
        let result = parse(&[("audiostream[0]", "1"), ("audiostream[1]", "abc")]);
        assert_eq!(
            result,
            Err(RoutingError::MalformedMapping {
                key: "audiostream[1]".to_string(),
                value: "abc".to_string(),
            })
        );
    }

    #[test]
    fn test_mapping_display() {
        let mapping = parse(&[("audiostream[0]", "1"), ("audiostream[1]", "2+3")]).unwrap();
        assert_eq!(mapping.to_string(), "{0: 1, 1: 2+3}");
    }
}
