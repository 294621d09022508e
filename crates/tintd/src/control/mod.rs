//! The single control surface exposed to presentation glue.
//!
//! [`ControlFacade`] turns user intents into worker signals and suspend timers
//! and fans every state change out to registered [`StateObserver`]s. It never
//! mutates [`WorkerState`] on its own; the mirror only changes when the worker
//! reports.

mod commands;
mod observer;

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use thiserror::Error;
use tint_protocol::{WorkerEvent, WorkerState};
use tracing::{debug, info};

use crate::process::SupervisorError;
use crate::suspend::{SuspendScheduler, minutes};

pub use commands::{CommandSource, ControlCommand, NoCommands};
pub use observer::{IconState, IndicatorObserver, LogObserver, StateObserver, StatusIndicator};

pub(crate) const CONTROL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::control");

/// Operations the facade needs from the supervised worker.
pub trait WorkerControl {
    /// Asks the worker to flip its enabled state.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError`] when the signal cannot be delivered.
    fn send_control_signal(&mut self) -> Result<(), SupervisorError>;

    /// Interrupts the worker and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError`] when signalling or waiting fails.
    fn terminate(&mut self) -> Result<(), SupervisorError>;
}

/// Source of monotonic time for suspend deadlines.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Errors surfaced by control operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The worker could not be signalled or reaped.
    #[error(transparent)]
    Worker(#[from] SupervisorError),
}

/// Glue-facing control surface over one worker.
pub struct ControlFacade<W, C = SystemClock> {
    worker: W,
    clock: C,
    state: WorkerState,
    suspend: SuspendScheduler,
    observers: Vec<Box<dyn StateObserver>>,
}

impl<W: WorkerControl> ControlFacade<W> {
    /// Wraps `worker` using the system clock.
    #[must_use]
    pub fn new(worker: W) -> Self {
        Self::with_clock(worker, SystemClock)
    }
}

impl<W: WorkerControl, C: Clock> ControlFacade<W, C> {
    /// Wraps `worker` using `clock` for suspend deadlines.
    #[must_use]
    pub fn with_clock(worker: W, clock: C) -> Self {
        Self {
            worker,
            clock,
            state: WorkerState::default(),
            suspend: SuspendScheduler::new(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer for state-changed notifications.
    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Cancels any pending suspend and asks the worker to flip its state.
    ///
    /// The mirrored state is untouched until the worker reports back.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Worker`] when the signal cannot be delivered.
    pub fn toggle(&mut self) -> Result<(), ControlError> {
        if self.suspend.cancel().is_some() {
            debug!(target: CONTROL_TARGET, "toggle cancelled pending suspend");
        }
        info!(target: CONTROL_TARGET, "toggle requested");
        self.worker.send_control_signal()?;
        Ok(())
    }

    /// Requests a specific enabled state, toggling only if it differs from
    /// the last reported one.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Worker`] when the signal cannot be delivered.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), ControlError> {
        if self.state.enabled == enabled {
            debug!(target: CONTROL_TARGET, enabled, "worker already in requested state");
            return Ok(());
        }
        self.toggle()
    }

    /// Disables the worker now if it is enabled and re-enables it after
    /// `duration_minutes`, replacing any pending suspend.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Worker`] when the signal cannot be delivered.
    /// No timer is armed in that case.
    pub fn suspend_for(&mut self, duration_minutes: NonZeroU32) -> Result<(), ControlError> {
        if self.state.enabled {
            self.worker.send_control_signal()?;
        }
        let now = self.clock.now();
        let replaced = self.suspend.arm(now, minutes(duration_minutes));
        info!(
            target: CONTROL_TARGET,
            minutes = duration_minutes.get(),
            replaced = replaced.is_some(),
            "suspend armed"
        );
        Ok(())
    }

    /// Snapshot of the mirrored worker state.
    #[must_use]
    pub fn current_state(&self) -> WorkerState {
        self.state.clone()
    }

    /// Applies a decoded event and notifies every observer with the result.
    pub fn apply(&mut self, event: WorkerEvent) {
        self.state.apply(event);
        for observer in &mut self.observers {
            observer.state_changed(&self.state);
        }
    }

    /// Fires the suspend timer if its deadline has passed.
    ///
    /// Expiry re-enables the worker only when it is still disabled. Returns
    /// whether a timer expired.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Worker`] when the re-enable signal cannot be
    /// delivered.
    pub fn fire_due_suspend(&mut self) -> Result<bool, ControlError> {
        let now = self.clock.now();
        if self.suspend.take_expired(now).is_none() {
            return Ok(false);
        }
        if self.state.enabled {
            debug!(target: CONTROL_TARGET, "suspend expired with worker already enabled");
        } else {
            info!(target: CONTROL_TARGET, "suspend expired; re-enabling worker");
            self.worker.send_control_signal()?;
        }
        Ok(true)
    }

    /// Deadline of the pending suspend, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.suspend.deadline()
    }

    /// How long the event loop may wait before the suspend needs servicing,
    /// capped at `max`.
    #[must_use]
    pub fn poll_timeout(&self, max: Duration) -> Duration {
        self.suspend
            .time_remaining(self.clock.now())
            .map_or(max, |remaining| remaining.min(max))
    }

    /// Applies a glue command. Returns `false` when the command asks the
    /// session to end.
    ///
    /// # Errors
    ///
    /// Propagates failures from the invoked operation.
    pub fn handle(&mut self, command: ControlCommand) -> Result<bool, ControlError> {
        debug!(target: CONTROL_TARGET, ?command, "handling command");
        match command {
            ControlCommand::Toggle => self.toggle()?,
            ControlCommand::SetEnabled(enabled) => self.set_enabled(enabled)?,
            ControlCommand::SuspendFor(duration) => self.suspend_for(duration)?,
            ControlCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Terminates the worker, disarming any pending suspend first.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Worker`] when termination fails.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        self.suspend.cancel();
        info!(target: CONTROL_TARGET, "shutting down worker");
        self.worker.terminate()?;
        Ok(())
    }

    /// Supervised worker.
    #[must_use]
    pub const fn worker(&self) -> &W {
        &self.worker
    }

    /// Mutable access to the supervised worker.
    pub const fn worker_mut(&mut self) -> &mut W {
        &mut self.worker
    }
}
