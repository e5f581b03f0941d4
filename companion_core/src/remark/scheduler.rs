//! Async driver for the remark state machine.
//!
//! One worker task owns the [`RemarkMachine`], the display timer and the
//! random source. Front-ends talk to it through a [`RemarkScheduler`] handle
//! and observe [`RemarkState`] through a watch channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::fallback::pick_fallback;
use super::machine::{RemarkMachine, RemarkState, RemarkTicket, Resolution};
use super::timer::DisplayTimer;
use crate::api::{RemarkGenerator, RemarkPrompt};
use crate::persona::AnimalKind;
use crate::utils::config::RemarkConfig;
use crate::utils::error::{CompanionError, GeneratorError};

/// Requests a front-end can make of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    Click,
    SetPersona(AnimalKind),
    SetEnabled(bool),
    Shutdown,
}

/// Messages produced by the worker's own spawned tasks.
enum Internal {
    Resolved {
        ticket: RemarkTicket,
        result: Result<String, GeneratorError>,
    },
    Expired {
        display: u64,
    },
}

enum WorkerEvent {
    Command(Option<SchedulerCommand>),
    Internal(Internal),
    Tick,
}

/// Handle to a running scheduler task.
pub struct RemarkScheduler {
    commands: mpsc::UnboundedSender<SchedulerCommand>,
    state: watch::Receiver<RemarkState>,
    task: JoinHandle<()>,
}

impl RemarkScheduler {
    /// Spawns the scheduler on the current tokio runtime.
    pub fn spawn(
        generator: Arc<dyn RemarkGenerator>,
        config: &RemarkConfig,
        persona: AnimalKind,
        enabled: bool,
    ) -> Self {
        Self::spawn_with_rng(generator, config, persona, enabled, fastrand::Rng::new())
    }

    /// Like [`RemarkScheduler::spawn`] with a caller-supplied random source.
    pub fn spawn_with_rng(
        generator: Arc<dyn RemarkGenerator>,
        config: &RemarkConfig,
        persona: AnimalKind,
        enabled: bool,
        rng: fastrand::Rng,
    ) -> Self {
        let machine = RemarkMachine::new(persona, enabled, config.tick_chance, config.discard_stale);
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(machine.state());

        let worker = SchedulerWorker {
            machine,
            generator,
            rng,
            timer: DisplayTimer::new(),
            tick_interval: config.tick_interval(),
            display_duration: config.display_duration(),
            commands: commands_rx,
            internal_tx,
            internal_rx,
            state_tx,
        };
        let task = tokio::spawn(worker.run());

        Self {
            commands,
            state,
            task,
        }
    }

    pub fn send(&self, command: SchedulerCommand) -> Result<(), CompanionError> {
        self.commands
            .send(command)
            .map_err(|_| CompanionError::SchedulerStopped)
    }

    pub fn click(&self) -> Result<(), CompanionError> {
        self.send(SchedulerCommand::Click)
    }

    pub fn set_persona(&self, persona: AnimalKind) -> Result<(), CompanionError> {
        self.send(SchedulerCommand::SetPersona(persona))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), CompanionError> {
        self.send(SchedulerCommand::SetEnabled(enabled))
    }

    /// Latest published state.
    pub fn state(&self) -> RemarkState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RemarkState> {
        self.state.clone()
    }

    /// Stops the worker and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(SchedulerCommand::Shutdown);
        let _ = self.task.await;
    }
}

struct SchedulerWorker {
    machine: RemarkMachine,
    generator: Arc<dyn RemarkGenerator>,
    rng: fastrand::Rng,
    timer: DisplayTimer,
    tick_interval: Duration,
    display_duration: Duration,
    commands: mpsc::UnboundedReceiver<SchedulerCommand>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    state_tx: watch::Sender<RemarkState>,
}

impl SchedulerWorker {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.tick_interval,
            self.tick_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                biased;
                command = self.commands.recv() => WorkerEvent::Command(command),
                Some(message) = self.internal_rx.recv() => WorkerEvent::Internal(message),
                _ = ticker.tick() => WorkerEvent::Tick,
            };

            match event {
                WorkerEvent::Command(None) | WorkerEvent::Command(Some(SchedulerCommand::Shutdown)) => {
                    break;
                }
                WorkerEvent::Command(Some(SchedulerCommand::Click)) => {
                    if let Some(ticket) = self.machine.click() {
                        self.request(ticket);
                    }
                }
                WorkerEvent::Command(Some(SchedulerCommand::SetPersona(persona))) => {
                    tracing::debug!(%persona, "persona changed");
                    self.machine.set_persona(persona);
                }
                WorkerEvent::Command(Some(SchedulerCommand::SetEnabled(enabled))) => {
                    let was_enabled = self.machine.is_enabled();
                    self.machine.set_enabled(enabled);
                    if enabled && !was_enabled {
                        // Ambient remarks start a full interval after enabling.
                        ticker.reset();
                    }
                    tracing::debug!(enabled, "remarks toggled");
                }
                WorkerEvent::Internal(Internal::Resolved { ticket, result }) => {
                    self.on_resolved(ticket, result);
                }
                WorkerEvent::Internal(Internal::Expired {
                    display: display_id,
                }) => {
                    if self.machine.expire(display_id) {
                        tracing::debug!(display_id, "remark cleared");
                    }
                }
                WorkerEvent::Tick => {
                    let draw = self.rng.f64();
                    if let Some(ticket) = self.machine.tick(draw) {
                        self.request(ticket);
                    }
                }
            }

            self.publish();
        }

        self.timer.cancel();
    }

    fn request(&self, ticket: RemarkTicket) {
        tracing::info!(
            persona = %ticket.persona,
            action = %ticket.action,
            ticket = ticket.id,
            "requesting remark"
        );

        let prompt = RemarkPrompt::new(ticket.persona.persona().prompt, ticket.action);
        let generator = Arc::clone(&self.generator);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = generator.generate(prompt).await;
            let _ = tx.send(Internal::Resolved { ticket, result });
        });
    }

    fn on_resolved(&mut self, ticket: RemarkTicket, result: Result<String, GeneratorError>) {
        let text = match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(ticket = ticket.id, error = %err, "remark generation failed, using fallback");
                pick_fallback(&mut self.rng).to_string()
            }
        };

        match self.machine.resolve(ticket.id, text) {
            Resolution::Shown {
                display: display_id,
            } => {
                let tx = self.internal_tx.clone();
                self.timer.arm(self.display_duration, move || {
                    let _ = tx.send(Internal::Expired {
                        display: display_id,
                    });
                });
                tracing::debug!(display_id, "remark shown, display timer armed");
            }
            Resolution::Discarded => {
                tracing::debug!(ticket = ticket.id, "discarding remark from outdated context");
            }
            Resolution::Unknown => {
                tracing::warn!(ticket = ticket.id, "result for unknown remark request");
            }
        }
    }

    fn publish(&self) {
        let next = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
