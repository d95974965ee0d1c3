//! Plan a capture source from a configuration snapshot and print the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ingest_engine::{
    create_controller, DecklinkSource, DryRunRunner, EngineVersion, PipelineRunner,
};
use ingest_ipc::{command_channel, event_channel, ConfigSnapshot, SourceCommand, SourceEvent};
use ingest_pipeline::{EmitterOptions, PipelineDescription};
use ingest_routing::RoutingPlan;

/// Engine version reported by the dry-run runner.
const DRY_RUN_ENGINE_VERSION: EngineVersion = EngineVersion::new(1, 22, 0);

#[derive(Parser, Debug)]
#[command(name = "ingest-plan", version, about)]
struct Args {
    /// Configuration snapshot (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Name of the capture source, without the `source.` prefix
    #[arg(long)]
    source: String,

    /// Capture without audio
    #[arg(long)]
    no_audio: bool,

    /// Capture without video
    #[arg(long)]
    no_video: bool,

    /// Pipeline fragment inserted after the video source
    #[arg(long)]
    deinterlacer: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Restart the source once through its controller and check the plan is reproduced
    #[arg(long)]
    restart: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Launch description in parse-launch syntax
    Text,
    /// Plan, ports and launch description as JSON
    Json,
}

/// Everything the JSON output reports about a source.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    source: &'a str,
    port: String,
    plan: &'a RoutingPlan,
    audio_ports: Vec<AudioPort>,
    video_port: Option<String>,
    description: &'a PipelineDescription,
}

/// Pad serving one output audio stream.
#[derive(Debug, Serialize)]
struct AudioPort {
    stream: u32,
    port: Option<String>,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ingest_cli=info,ingest_engine=info,ingest_routing=info,ingest_pipeline=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<ConfigSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

fn emitter_options(args: &Args) -> EmitterOptions {
    EmitterOptions {
        has_audio: !args.no_audio,
        has_video: !args.no_video,
        deinterlacer: args.deinterlacer.clone(),
    }
}

fn render<R: PipelineRunner>(source: &DecklinkSource<R>, format: Format) -> Result<String> {
    let (Some(plan), Some(description)) = (source.plan(), source.description()) else {
        bail!("Source {} has no plan", source.name());
    };

    match format {
        Format::Text => Ok(description.to_string()),
        Format::Json => {
            let audio_ports = plan
                .output_streams()
                .into_iter()
                .map(|stream| AudioPort {
                    stream,
                    port: source.audio_port(stream),
                })
                .collect();
            let report = PlanReport {
                source: source.name(),
                port: source.port(),
                plan: plan.as_ref(),
                audio_ports,
                video_port: source.video_port(),
                description,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Run the source under a controller, restart it once and return the
/// plans published before and after.
fn restart_through_controller<R: PipelineRunner + 'static>(
    source: DecklinkSource<R>,
) -> Result<(RoutingPlan, RoutingPlan)> {
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();

    let handle = thread::spawn(move || {
        let mut controller = create_controller(source, command_rx, event_tx);
        controller.run();
    });

    for command in [SourceCommand::Restart, SourceCommand::Shutdown] {
        command_tx
            .send(command)
            .context("Source controller exited early")?;
    }
    if handle.join().is_err() {
        bail!("Source controller panicked");
    }

    let mut plans = Vec::new();
    for event in event_rx.try_iter() {
        match event {
            SourceEvent::PlanCompiled { plan, .. } => plans.push(plan),
            SourceEvent::Error { message } => bail!("Restart failed: {message}"),
            _ => {}
        }
    }

    let mut plans = plans.into_iter();
    match (plans.next(), plans.next()) {
        (Some(before), Some(after)) => Ok((before, after)),
        _ => bail!("Source controller did not publish a plan after restart"),
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = Arc::new(load_config(&args.config)?);
    let source = DecklinkSource::new(
        &args.source,
        config,
        emitter_options(&args),
        DryRunRunner::new(DRY_RUN_ENGINE_VERSION),
    )
    .with_context(|| format!("Failed to plan source {}", args.source))?;
    info!(source = %source, "Source planned");

    println!("{}", render(&source, args.format)?);

    if args.restart {
        let (before, after) = restart_through_controller(source)?;
        if before != after {
            warn!("Plan changed across restart");
            bail!("Restart produced a different plan");
        }
        info!(rules = after.rules().len(), "Plan reproduced after restart");
    }

    Ok(())
}
