//! Error types for capture sources.

use thiserror::Error;

use ingest_routing::RoutingError;

/// Errors reported by a pipeline execution engine.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The engine rejected or failed to start a description.
    #[error("Pipeline launch failed: {0}")]
    Launch(String),

    /// The engine failed to tear the pipeline down.
    #[error("Pipeline stop failed: {0}")]
    Stop(String),
}

/// Errors that prevent a capture source from being created or restarted.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The audio stream mapping is invalid.
    #[error("Invalid audio routing: {0}")]
    Routing(#[from] RoutingError),

    /// A scalar setting could not be decoded.
    #[error("Invalid value {value:?} for {section}.{key}")]
    InvalidSetting {
        section: String,
        key: String,
        value: String,
    },

    /// The execution engine failed.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_error_wrapped() {
        let err = SourceError::from(RoutingError::ChannelCapacityExceeded { requested: 20 });
        assert_eq!(
            err.to_string(),
            "Invalid audio routing: Capture devices support up to 16 channels, 20 requested"
        );
    }

    #[test]
    fn test_invalid_setting_message() {
        let err = SourceError::InvalidSetting {
            section: "source.cam1".to_string(),
            key: "devicenumber".to_string(),
            value: "two".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"two\" for source.cam1.devicenumber"
        );
    }

    #[test]
    fn test_runner_error_transparent() {
        let err = SourceError::from(RunnerError::Launch("no such element".to_string()));
        assert_eq!(err.to_string(), "Pipeline launch failed: no such element");
    }
}
