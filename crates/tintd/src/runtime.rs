//! The cooperative event loop driving one worker session.
//!
//! Each iteration drains deferred signals and queued commands, services the
//! suspend timer, reaps the worker if it exited, and finally waits on the
//! worker's pipes with a timeout no longer than the next suspend deadline.

use std::os::raw::c_int;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::signal::Signal;
use thiserror::Error;
use tracing::{debug, trace};

use crate::control::{Clock, CommandSource, ControlError, ControlFacade};
use crate::process::{
    ExitClassification, FailureReport, ProcessSupervisor, StreamKind, SupervisorError,
};
use crate::signals::SignalSource;

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Longest single wait on the worker's pipes.
pub const MAX_POLL_WAIT: Duration = Duration::from_millis(250);

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The worker exited with status zero.
    WorkerExited,
    /// A shutdown signal was received.
    Interrupted {
        /// Signal number received.
        signal: c_int,
    },
    /// Glue requested the session to end.
    Quit,
    /// The worker exited abnormally.
    WorkerFailed(FailureReport),
}

impl SessionOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::WorkerFailed(_) => 1,
            Self::WorkerExited | Self::Interrupted { .. } | Self::Quit => 0,
        }
    }
}

/// Errors that abort the event loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A control operation failed.
    #[error(transparent)]
    Control(#[from] ControlError),
    /// Reading, reaping, or signalling the worker failed.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    /// Waiting for pipe readiness failed.
    #[error("failed to poll worker pipes: {source}")]
    Poll {
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
}

/// Runs the loop until the worker exits, a shutdown signal arrives, or glue
/// sends [`Quit`](crate::control::ControlCommand::Quit).
///
/// The worker is not terminated here; callers follow up with
/// [`ControlFacade::shutdown`].
///
/// # Errors
///
/// Returns [`SessionError`] when the worker cannot be read, reaped, or
/// signalled, or when polling fails.
pub fn run_session<C, S, Q>(
    facade: &mut ControlFacade<ProcessSupervisor, C>,
    signals: &mut S,
    commands: &mut Q,
) -> Result<SessionOutcome, SessionError>
where
    C: Clock,
    S: SignalSource,
    Q: CommandSource,
{
    loop {
        if let Some(outcome) = step(facade, signals, commands)? {
            debug!(target: RUNTIME_TARGET, ?outcome, "session finished");
            return Ok(outcome);
        }
    }
}

fn step<C, S, Q>(
    facade: &mut ControlFacade<ProcessSupervisor, C>,
    signals: &mut S,
    commands: &mut Q,
) -> Result<Option<SessionOutcome>, SessionError>
where
    C: Clock,
    S: SignalSource,
    Q: CommandSource,
{
    let pending = signals.drain();
    if let Some(signal) = pending.shutdown {
        return Ok(Some(SessionOutcome::Interrupted { signal }));
    }
    for _ in 0..pending.relays {
        facade.worker().relay_signal(Signal::SIGUSR1)?;
    }
    if pending.child_exited {
        trace!(target: RUNTIME_TARGET, "child state changed");
    }

    while let Some(command) = commands.next_command() {
        if !facade.handle(command)? {
            return Ok(Some(SessionOutcome::Quit));
        }
    }

    facade.fire_due_suspend()?;

    if let Some(status) = facade.worker_mut().try_reap()? {
        let report = facade.worker_mut().on_exit(status)?;
        for event in report.events {
            facade.apply(event);
        }
        let outcome = match report.classification {
            ExitClassification::Clean => SessionOutcome::WorkerExited,
            ExitClassification::Failed(failure) => SessionOutcome::WorkerFailed(failure),
        };
        return Ok(Some(outcome));
    }

    for kind in wait_readable(facade)? {
        let batch = facade.worker_mut().on_readable(kind)?;
        for event in batch.events {
            facade.apply(event);
        }
    }
    Ok(None)
}

fn wait_readable<C: Clock>(
    facade: &ControlFacade<ProcessSupervisor, C>,
) -> Result<Vec<StreamKind>, SessionError> {
    let timeout = facade.poll_timeout(MAX_POLL_WAIT);
    let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
    let worker = facade.worker();

    let mut kinds = Vec::with_capacity(StreamKind::ALL.len());
    let mut fds = Vec::with_capacity(StreamKind::ALL.len());
    for kind in StreamKind::ALL {
        if let Some(fd) = worker.poll_fd(kind) {
            kinds.push(kind);
            fds.push(PollFd::new(fd, PollFlags::POLLIN));
        }
    }

    match poll(&mut fds, PollTimeout::from(millis)) {
        Ok(0) => {
            trace!(target: RUNTIME_TARGET, millis, "poll timed out");
            Ok(Vec::new())
        }
        Ok(_) => {
            let wake = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
            Ok(fds
                .iter()
                .zip(kinds)
                .filter(|(fd, _)| fd.revents().is_some_and(|events| events.intersects(wake)))
                .map(|(_, kind)| kind)
                .collect())
        }
        Err(Errno::EINTR) => Ok(Vec::new()),
        Err(source) => Err(SessionError::Poll { source }),
    }
}
