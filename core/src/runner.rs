//! Async driver for the guide engine
//!
//! The runner owns the [`GuideEngine`] and the entity table and runs them on a
//! single tokio task. Events, operator commands and world updates arrive on
//! one channel; between messages the task sleeps until the next timer is due.
//! The engine clock is the time elapsed since the runner started.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::engine::{EngineStatus, GuideEngine};
use crate::events::GuideEvent;
use crate::world::EntityLookup;

/// Operator commands.
#[derive(Debug)]
pub enum Control {
    /// Flip the global enable switch
    Toggle,
    /// Flip a named debug flag
    ToggleDebug(String),
    /// Re-run the zone load for the current zone
    Reload,
    /// Report engine state
    Status(oneshot::Sender<EngineStatus>),
}

/// Mutation applied to the runner's entity table.
pub type WorldUpdate<W> = Box<dyn FnOnce(&mut W) + Send>;

/// Everything the runner task accepts.
pub enum RunnerInput<W> {
    Event(GuideEvent),
    Control(Control),
    UpdateWorld(WorldUpdate<W>),
    Shutdown,
}

impl<W> std::fmt::Debug for RunnerInput<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::Control(control) => f.debug_tuple("Control").field(control).finish(),
            Self::UpdateWorld(_) => f.write_str("UpdateWorld"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

pub struct Runner<W> {
    engine: GuideEngine,
    world: W,
    rx: mpsc::UnboundedReceiver<RunnerInput<W>>,
}

impl<W: EntityLookup> Runner<W> {
    /// Create a runner and the sender used to feed it.
    pub fn new(engine: GuideEngine, world: W) -> (Self, mpsc::UnboundedSender<RunnerInput<W>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { engine, world, rx }, tx)
    }

    /// Run until [`RunnerInput::Shutdown`] arrives or every sender is dropped.
    ///
    /// Returns the engine and world so callers can inspect final state.
    pub async fn run(mut self) -> (GuideEngine, W) {
        let started = Instant::now();
        tracing::debug!(target: "guide", "Runner started");

        loop {
            let deadline = self.engine.next_deadline().map(|due| started + due);
            let wake = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                input = self.rx.recv() => {
                    // Bring the clock up to date so new delays start from now
                    self.engine.advance_to(started.elapsed());
                    match input {
                        Some(RunnerInput::Shutdown) | None => break,
                        Some(input) => self.handle(input),
                    }
                }
                _ = wake => {
                    let fired = self.engine.advance_to(started.elapsed());
                    tracing::trace!(target: "guide", fired, "Timers fired");
                }
            }
        }

        let pending = self.engine.timers().len();
        tracing::debug!(target: "guide", pending, "Runner stopped");
        (self.engine, self.world)
    }

    fn handle(&mut self, input: RunnerInput<W>) {
        match input {
            RunnerInput::Event(event) => self.engine.handle_event(&event, &self.world),
            RunnerInput::Control(control) => self.control(control),
            RunnerInput::UpdateWorld(update) => update(&mut self.world),
            RunnerInput::Shutdown => {}
        }
    }

    fn control(&mut self, control: Control) {
        match control {
            Control::Toggle => {
                let enabled = self.engine.toggle_enabled();
                tracing::info!(
                    "Guide module has been {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            Control::ToggleDebug(name) => match self.engine.toggle_debug(&name) {
                Some(on) => tracing::info!(
                    "Debug {name} has been {}",
                    if on { "enabled" } else { "disabled" }
                ),
                None => tracing::warn!(
                    flag = %name,
                    valid = ?warden_types::DebugFlags::NAMES,
                    "Unknown debug flag"
                ),
            },
            Control::Reload => {
                if self.engine.reload_zone() {
                    let status = self.engine.status();
                    tracing::info!(
                        zone = ?status.zone,
                        found = status.guide_found,
                        entries = status.guide_entries,
                        "Guide reloaded"
                    );
                } else {
                    tracing::warn!("No zone loaded yet, nothing to reload");
                }
            }
            Control::Status(reply) => {
                // Receiver may have given up waiting
                let _ = reply.send(self.engine.status());
            }
        }
    }
}
