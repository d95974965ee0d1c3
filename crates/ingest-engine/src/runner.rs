//! Boundary to the pipeline execution engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use ingest_pipeline::PipelineDescription;

use crate::error::RunnerError;

/// Version of the pipeline execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl EngineVersion {
    /// Create a version.
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Executes launch descriptions on behalf of a capture source.
///
/// Implementations own the device and the running pipeline. A source calls
/// [`stop`](Self::stop) before every relaunch, so at most one pipeline per
/// runner is alive at a time.
pub trait PipelineRunner: Send {
    /// Engine version, used to warn about missing multichannel support.
    fn version(&self) -> EngineVersion;

    /// Build and start a pipeline from the description.
    fn launch(&mut self, description: &PipelineDescription) -> Result<(), RunnerError>;

    /// Tear the running pipeline down. Stopping an idle runner is a no-op.
    fn stop(&mut self) -> Result<(), RunnerError>;
}

/// Runner that only logs what it would launch.
#[derive(Debug, Clone)]
pub struct DryRunRunner {
    version: EngineVersion,
    running: bool,
}

impl DryRunRunner {
    /// Create a dry-run runner reporting the given engine version.
    pub fn new(version: EngineVersion) -> Self {
        Self {
            version,
            running: false,
        }
    }

    /// True between a launch and the next stop.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl PipelineRunner for DryRunRunner {
    fn version(&self) -> EngineVersion {
        self.version
    }

    fn launch(&mut self, description: &PipelineDescription) -> Result<(), RunnerError> {
        info!(blocks = description.blocks().len(), "Dry run: pipeline not started");
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RunnerError> {
        self.running = false;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(EngineVersion::new(1, 12, 2) < EngineVersion::new(1, 12, 3));
        assert!(EngineVersion::new(1, 11, 9) < EngineVersion::new(1, 12, 0));
        assert!(EngineVersion::new(2, 0, 0) > EngineVersion::new(1, 22, 5));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(EngineVersion::new(1, 12, 3).to_string(), "1.12.3");
    }

    #[test]
    fn test_dry_run_tracks_running() {
        let mut runner = DryRunRunner::new(EngineVersion::new(1, 22, 0));
        assert!(!runner.is_running());

        runner.launch(&PipelineDescription::new()).unwrap();
        assert!(runner.is_running());

        runner.stop().unwrap();
        assert!(!runner.is_running());
    }
}
