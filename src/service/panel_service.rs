//! Panel service: command handling and event broadcasting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::{CommandName, EventBus, SessionRegistry, StreamEvent};
use crate::error::PanelError;

/// What the service did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An execution was scheduled for the next loop tick.
    ExecutionScheduled,
    /// The command is not handled by the panel and was ignored.
    Ignored,
}

/// Orchestration layer between the HTTP routers and the event bus.
///
/// Commands never do work inline; `execute` only raises a flag that the
/// execution loop picks up on its next tick.
#[derive(Debug)]
pub struct PanelService {
    event_bus: EventBus,
    sessions: SessionRegistry,
    max_event_bytes: usize,
    execution_pending: AtomicBool,
}

impl PanelService {
    /// Creates a new `PanelService`.
    #[must_use]
    pub fn new(event_bus: EventBus, sessions: SessionRegistry, max_event_bytes: usize) -> Self {
        Self {
            event_bus,
            sessions,
            max_event_bytes,
            execution_pending: AtomicBool::new(false),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the session slot table.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Returns the size limit for one encoded event.
    #[must_use]
    pub fn max_event_bytes(&self) -> usize {
        self.max_event_bytes
    }

    /// Handles a `POST /api/<name>` command.
    pub fn handle_command(&self, command: &CommandName) -> CommandOutcome {
        if command.is_execute() {
            tracing::info!(%command, "executing");
            self.execution_pending.store(true, Ordering::SeqCst);
            return CommandOutcome::ExecutionScheduled;
        }
        tracing::debug!(%command, "command not handled");
        CommandOutcome::Ignored
    }

    /// Clears the pending-execution flag, returning its previous value.
    pub fn take_pending(&self) -> bool {
        self.execution_pending.swap(false, Ordering::SeqCst)
    }

    /// Returns `true` if an execution is waiting for the next tick.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.execution_pending.load(Ordering::SeqCst)
    }

    /// Validates an event and publishes it to every open session.
    ///
    /// Returns the number of sessions that received it.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::EmptyEvent`] or [`PanelError::EventTooLarge`]
    /// if the event cannot be encoded within the size limit.
    pub fn broadcast(&self, event: StreamEvent) -> Result<usize, PanelError> {
        event.encode(self.max_event_bytes)?;
        let receivers = self.event_bus.publish(event);
        tracing::debug!(receivers, "event broadcast");
        Ok(receivers)
    }

    /// Event sent to a session right after it joins.
    #[must_use]
    pub fn joined_event(&self) -> StreamEvent {
        StreamEvent::reset()
    }

    /// Runs one loop iteration: broadcasts `reset` if an execution is pending.
    ///
    /// Returns `true` when a reset was broadcast.
    pub fn tick(&self) -> bool {
        if !self.take_pending() {
            return false;
        }
        match self.broadcast(StreamEvent::reset()) {
            Ok(receivers) => {
                tracing::info!(receivers, "reset client views");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to broadcast reset");
                false
            }
        }
    }

    /// Ticks every `interval` until `shutdown` flips to `true`.
    pub async fn run_execution_loop(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("execution loop stopped");
    }
}
