//! Output stream bounds checking against the mix configuration.

use crate::error::RoutingError;
use crate::mapping::StreamMapping;
use crate::RoutingResult;

/// Reject mappings that target output streams beyond `enabled_streams`.
///
/// Entries are checked in declaration order and the first offender is
/// reported.
pub fn validate_bounds(mapping: &StreamMapping, enabled_streams: u32) -> RoutingResult<()> {
    match mapping
        .iter()
        .find(|entry| entry.output_stream >= enabled_streams)
    {
        Some(entry) => Err(RoutingError::StreamIndexOutOfRange {
            index: entry.output_stream,
            limit: enabled_streams,
        }),
        None => Ok(()),
    }
}
