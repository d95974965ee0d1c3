//! Command loop owning one capture source.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use ingest_ipc::{SourceCommand, SourceEvent, SourceState};

use crate::runner::PipelineRunner;
use crate::source::DecklinkSource;

/// Serializes commands to a single source and publishes what happens to it.
pub struct SourceController<R: PipelineRunner> {
    command_rx: Receiver<SourceCommand>,
    event_tx: Sender<SourceEvent>,
    source: DecklinkSource<R>,
    state: Arc<RwLock<SourceState>>,
}

impl<R: PipelineRunner> SourceController<R> {
    /// Create a controller for an already constructed source.
    pub fn new(
        source: DecklinkSource<R>,
        command_rx: Receiver<SourceCommand>,
        event_tx: Sender<SourceEvent>,
    ) -> Self {
        let state = Arc::new(RwLock::new(source.state().clone()));
        Self {
            command_rx,
            event_tx,
            source,
            state,
        }
    }

    /// Shared view of the source state, readable from other threads.
    pub fn state_handle(&self) -> Arc<RwLock<SourceState>> {
        Arc::clone(&self.state)
    }

    /// Run the command loop (blocking) until shutdown or until the command
    /// channel disconnects.
    #[instrument(name = "controller_run", skip(self), fields(source = %self.source.name()))]
    pub fn run(&mut self) {
        info!("Source controller starting");
        self.send_event(SourceEvent::Ready);
        self.publish_plan();

        while let Ok(command) = self.command_rx.recv() {
            if !self.handle_command(command) {
                break;
            }
        }

        info!("Source controller stopped");
    }

    /// Handle a command. Returns false if the loop should end.
    fn handle_command(&mut self, command: SourceCommand) -> bool {
        debug!(?command, "Handling command");

        match command {
            SourceCommand::Restart => {
                match self.source.restart() {
                    Ok(()) => self.publish_plan(),
                    Err(e) => self.send_error(e.to_string()),
                }
                self.sync_state();
            }
            SourceCommand::Stop => {
                if let Err(e) = self.source.stop() {
                    self.send_error(e.to_string());
                }
                self.sync_state();
            }
            SourceCommand::GetPlan => {
                let plan = self.source.plan().map(|plan| (*plan).clone());
                self.send_event(SourceEvent::Plan(plan));
            }
            SourceCommand::GetState => {
                let state = self.state.read().clone();
                self.send_event(SourceEvent::State(state));
            }
            SourceCommand::Shutdown => {
                if self.source.state().is_running() {
                    if let Err(e) = self.source.stop() {
                        self.send_error(e.to_string());
                    }
                    self.sync_state();
                }
                self.send_event(SourceEvent::Shutdown);
                return false;
            }
        }

        true
    }

    fn publish_plan(&self) {
        if let Some(plan) = self.source.plan() {
            self.send_event(SourceEvent::PlanCompiled {
                source: self.source.name().to_string(),
                plan: (*plan).clone(),
            });
        }
    }

    fn sync_state(&self) {
        let current = self.source.state().clone();
        let previous = {
            let mut state = self.state.write();
            if *state == current {
                return;
            }
            std::mem::replace(&mut *state, current.clone())
        };

        debug!(
            previous = %previous.name(),
            current = %current.name(),
            "State transition"
        );

        self.send_event(SourceEvent::StateChanged {
            previous: Box::new(previous),
            current: Box::new(current),
        });
    }

    fn send_error(&self, message: String) {
        warn!(%message, "Source command failed");
        self.send_event(SourceEvent::Error { message });
    }

    fn send_event(&self, event: SourceEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::runner::testing::RecordingRunner;
    use ingest_ipc::{command_channel, event_channel, ConfigSection, ConfigSnapshot};
    use ingest_pipeline::EmitterOptions;

    fn source(runner: RecordingRunner) -> DecklinkSource<RecordingRunner> {
        let config = Arc::new(
            ConfigSnapshot::new()
                .with_section(ConfigSection::new("mix").with("audiostreams", "2"))
                .with_section(
                    ConfigSection::new("source.cam1")
                        .with("audiostream[0]", "4")
                        .with("audiostream[1]", "0+1"),
                ),
        );
        DecklinkSource::new("cam1", config, EmitterOptions::default(), runner).unwrap()
    }

    fn drain(rx: &Receiver<SourceEvent>) -> Vec<SourceEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_run_publishes_initial_plan() {
        let (runner, _log) = RecordingRunner::new();
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let mut controller = SourceController::new(source(runner), command_rx, event_tx);

        command_tx.send(SourceCommand::Shutdown).unwrap();
        controller.run();

        let events = drain(&event_rx);
        assert_eq!(events[0], SourceEvent::Ready);
        assert!(matches!(
            &events[1],
            SourceEvent::PlanCompiled { source, plan }
                if source == "cam1" && plan.rules().len() == 2
        ));
        assert_eq!(events.last(), Some(&SourceEvent::Shutdown));
    }

    #[test]
    fn test_restart_republishes_identical_plan() {
        let (runner, log) = RecordingRunner::new();
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let mut controller = SourceController::new(source(runner), command_rx, event_tx);

        command_tx.send(SourceCommand::Restart).unwrap();
        command_tx.send(SourceCommand::Shutdown).unwrap();
        controller.run();

        let plans: Vec<_> = drain(&event_rx)
            .into_iter()
            .filter_map(|event| match event {
                SourceEvent::PlanCompiled { plan, .. } => Some(plan),
                _ => None,
            })
            .collect();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0], plans[1]);

        let log = log.lock();
        assert_eq!(log.launched.len(), 2);
        assert_eq!(log.stops, 2);
    }

    #[test]
    fn test_failed_restart_reports_error() {
        let (runner, _log) = RecordingRunner::new();
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let mut source = source(runner);
        source.runner_mut().fail_launch = true;
        let mut controller = SourceController::new(source, command_rx, event_tx);
        let state = controller.state_handle();

        command_tx.send(SourceCommand::Restart).unwrap();
        command_tx.send(SourceCommand::GetPlan).unwrap();
        command_tx.send(SourceCommand::Shutdown).unwrap();
        controller.run();

        let events = drain(&event_rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, SourceEvent::Error { message } if message.contains("refused"))));
        assert!(events.contains(&SourceEvent::Plan(None)));
        assert!(state.read().is_error());
    }

    #[test]
    fn test_stop_transitions_state() {
        let (runner, _log) = RecordingRunner::new();
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let mut controller = SourceController::new(source(runner), command_rx, event_tx);
        let state = controller.state_handle();
        assert!(state.read().is_running());

        command_tx.send(SourceCommand::Stop).unwrap();
        command_tx.send(SourceCommand::GetState).unwrap();
        drop(command_tx);
        controller.run();

        let events = drain(&event_rx);
        let transitions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SourceEvent::StateChanged { .. }))
            .collect();
        assert_eq!(transitions.len(), 1);
        assert!(matches!(
            transitions[0],
            SourceEvent::StateChanged { previous, current }
                if previous.is_running() && current.is_stopped()
        ));
        assert_eq!(events.last(), Some(&SourceEvent::State(SourceState::Stopped)));
        assert!(state.read().is_stopped());
        assert!(!events.contains(&SourceEvent::Shutdown));
    }

    #[test]
    fn test_controller_on_thread() {
        let (runner, log) = RecordingRunner::new();
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let source = source(runner);

        let handle = thread::spawn(move || {
            let mut controller = SourceController::new(source, command_rx, event_tx);
            controller.run();
        });

        command_tx.send(SourceCommand::GetPlan).unwrap();
        command_tx.send(SourceCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events = drain(&event_rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, SourceEvent::Plan(Some(plan)) if plan.rules().len() == 2)));
        // Shutdown stops the pipeline, dropping the source stops the idle runner again.
        assert_eq!(log.lock().stops, 2);
    }
}
