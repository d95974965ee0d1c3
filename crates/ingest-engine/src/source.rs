//! DeckLink capture source: configuration to running pipeline.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use ingest_ipc::{ConfigSnapshot, SourceState};
use ingest_pipeline::{DeviceSettings, EmitterOptions, PipelineDescription, PlanEmitter};
use ingest_routing::{compile_plan, RoutingPlan, StreamMapping};

use crate::runner::PipelineRunner;
use crate::settings::{device_settings, MixSettings};
use crate::{SourceResult, MIN_MULTICHANNEL_ENGINE_VERSION};

/// A capture card source with planned audio routing.
///
/// The routing plan is compiled from the configuration snapshot when the
/// source is created and again, from scratch, on every restart. A source
/// whose configuration does not plan is never created.
pub struct DecklinkSource<R: PipelineRunner> {
    name: String,
    config: Arc<ConfigSnapshot>,
    options: EmitterOptions,
    runner: R,
    device: DeviceSettings,
    plan: Option<Arc<RoutingPlan>>,
    description: Option<PipelineDescription>,
    state: SourceState,
}

impl<R: PipelineRunner> DecklinkSource<R> {
    /// Plan the source from `config` and launch it on `runner`.
    ///
    /// Every configuration error is reported before the runner is touched.
    #[instrument(name = "source_new", skip(config, options, runner))]
    pub fn new(
        name: &str,
        config: Arc<ConfigSnapshot>,
        options: EmitterOptions,
        runner: R,
    ) -> SourceResult<Self> {
        let mut source = Self {
            name: name.to_string(),
            config,
            options,
            runner,
            device: DeviceSettings::default(),
            plan: None,
            description: None,
            state: SourceState::Idle,
        };
        source.launch()?;
        Ok(source)
    }

    fn launch(&mut self) -> SourceResult<()> {
        let device = device_settings(&self.config, &self.name)?;
        let mix = MixSettings::from_snapshot(&self.config)?;

        let section = ConfigSnapshot::source_section_name(&self.name);
        let mapping = match self.config.section(&section) {
            Some(section) => StreamMapping::parse(section.iter())?,
            None => StreamMapping::new(),
        };
        info!(source = %self.name, %mapping, "Audio stream mapping");

        let plan = compile_plan(&mapping, mix.audio_streams)?;
        info!(
            source = %self.name,
            channels = plan.required_input_channels(),
            "Configuring capture device input"
        );
        self.check_engine_version(&plan);

        let description = PlanEmitter::new(&self.name, &device, &plan, &self.options).emit();
        self.runner.launch(&description)?;

        self.state = SourceState::Running {
            input_channels: plan.required_input_channels(),
            audio_streams: plan.audio_stream_count(),
        };
        self.device = device;
        self.plan = Some(Arc::new(plan));
        self.description = Some(description);
        Ok(())
    }

    fn check_engine_version(&self, plan: &RoutingPlan) {
        let version = self.runner.version();
        if plan.tier().is_multichannel() && version < MIN_MULTICHANNEL_ENGINE_VERSION {
            warn!(
                source = %self.name,
                %version,
                required = %MIN_MULTICHANNEL_ENGINE_VERSION,
                channels = plan.required_input_channels(),
                "Pipeline engine is probably too old for more than 2 capture channels"
            );
        }
    }

    /// Tear the pipeline down and rebuild it from the same configuration.
    ///
    /// The previous plan is discarded before recompiling. On failure the
    /// source is left in the error state without a plan.
    #[instrument(name = "source_restart", skip(self), fields(source = %self.name))]
    pub fn restart(&mut self) -> SourceResult<()> {
        info!("Restarting source");

        self.plan = None;
        self.description = None;

        let result: SourceResult<()> = self
            .runner
            .stop()
            .map_err(Into::into)
            .and_then(|()| self.launch());
        if let Err(e) = &result {
            self.state = SourceState::Error {
                message: e.to_string(),
            };
        }
        result
    }

    /// Stop the pipeline. The plan stays available for inspection.
    #[instrument(name = "source_stop", skip(self), fields(source = %self.name))]
    pub fn stop(&mut self) -> SourceResult<()> {
        self.runner.stop()?;
        self.state = SourceState::Stopped;
        debug!("Source stopped");
        Ok(())
    }

    /// Source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> &SourceState {
        &self.state
    }

    /// Current routing plan, absent after a failed restart.
    pub fn plan(&self) -> Option<Arc<RoutingPlan>> {
        self.plan.clone()
    }

    /// Launch description of the current plan.
    pub fn description(&self) -> Option<&PipelineDescription> {
        self.description.as_ref()
    }

    /// Device settings the pipeline was launched with.
    pub fn device(&self) -> &DeviceSettings {
        &self.device
    }

    /// The execution engine driving this source.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[cfg(test)]
    pub(crate) fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// Number of output audio streams this source provides.
    pub fn audio_channels(&self) -> usize {
        self.plan
            .as_ref()
            .map_or(0, |plan| plan.audio_stream_count())
    }

    /// Pad other pipelines read an output audio stream from.
    pub fn audio_port(&self, output_stream: u32) -> Option<String> {
        let plan = self.plan.as_ref()?;
        PlanEmitter::new(&self.name, &self.device, plan, &self.options).audio_port(output_stream)
    }

    /// Pad other pipelines read the video from.
    pub fn video_port(&self) -> Option<String> {
        let plan = self.plan.as_ref()?;
        PlanEmitter::new(&self.name, &self.device, plan, &self.options).video_port()
    }

    /// Human-readable device description.
    pub fn port(&self) -> String {
        format!("Decklink #{}", self.device.device_number)
    }
}

impl<R: PipelineRunner> fmt::Display for DecklinkSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecklinkSource[{}] reading card #{}",
            self.name, self.device.device_number
        )
    }
}

impl<R: PipelineRunner> Drop for DecklinkSource<R> {
    fn drop(&mut self) {
        let _ = self.runner.stop();
    }
}
