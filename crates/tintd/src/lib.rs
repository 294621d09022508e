//! Supervision core for a colour-temperature worker.
//!
//! `tintd` launches a single worker process, mirrors the state it reports on
//! standard output, and relays user intents back to it as signals. Everything
//! runs on one control thread:
//!
//! 1. [`ProcessSupervisor`] owns the child and its two non-blocking pipes,
//!    decoding stdout into events and collecting stderr for failure reports.
//! 2. [`ControlFacade`] is the surface presentation glue calls (`toggle`,
//!    `suspend_for`, `current_state`, `shutdown`) and the source of
//!    state-changed notifications.
//! 3. [`SignalRelay`] records asynchronous signals so [`run_session`] can act
//!    on them between iterations instead of inside a handler.
//!
//! The worker is always interrupted and reaped before [`run`] returns.

mod cli;
mod control;
mod process;
mod runtime;
mod signals;
mod suspend;
mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tint_config::Config;
use tracing::warn;

pub use cli::{ArgumentSplit, split_arguments};
pub use control::{
    Clock, CommandSource, ControlCommand, ControlError, ControlFacade, IconState,
    IndicatorObserver, LogObserver, NoCommands, StateObserver, StatusIndicator, SystemClock,
    WorkerControl,
};
pub use process::{
    ExitClassification, ExitReport, FailureReport, LOCALE_VARIABLES, ProcessSupervisor, READ_CHUNK,
    ReadBatch, ReadStatus, SpawnError, StreamKind, SupervisorError, WorkerCommand,
};
pub use runtime::{MAX_POLL_WAIT, SessionError, SessionOutcome, run_session};
pub use signals::{
    PendingSignals, RELAY_SIGNAL, SHUTDOWN_SIGNALS, SignalError, SignalRelay, SignalSource,
};
pub use suspend::{SuspendScheduler, SuspendTimer, minutes};
pub use telemetry::{TelemetryError, TelemetryHandle};

const RUN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader {
    /// Loads configuration from the configuration part of the command line.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when any layer fails to parse.
    fn load(&self, args: &[OsString]) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that layers defaults, file, environment, and flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(args.iter().cloned())
    }
}

/// Errors that prevent a session from starting or finishing cleanly.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Logging could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Signal handlers could not be installed.
    #[error(transparent)]
    Signals(#[from] SignalError),
    /// The worker could not be launched.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// The event loop aborted.
    #[error("worker session failed: {source}")]
    Session {
        /// Underlying loop error.
        #[source]
        source: SessionError,
    },
    /// The worker could not be stopped.
    #[error("failed to stop worker: {source}")]
    Shutdown {
        /// Underlying control error.
        #[source]
        source: ControlError,
    },
}

/// Runs the supervisor with the process arguments, returning its exit code.
pub fn run<I, T, W>(args: I, stderr: &mut W) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    W: Write,
{
    ExitCode::from(run_with(&OrthoConfigLoader, args, stderr))
}

/// Runs the supervisor with an injected loader, returning the exit status.
///
/// Failure reports and setup errors are written to `stderr`.
pub fn run_with<L, I, T, W>(loader: &L, args: I, stderr: &mut W) -> u8
where
    L: ConfigLoader + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    W: Write,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match supervise(loader, &args) {
        Ok(SessionOutcome::WorkerFailed(report)) => {
            emit(stderr, &report.to_string());
            1
        }
        Ok(outcome) => outcome.exit_code(),
        Err(error) => {
            emit(stderr, &format!("tintd: {error}"));
            1
        }
    }
}

/// Loads configuration, launches the worker, and runs one session.
///
/// The worker is terminated before this returns, whatever the outcome.
///
/// # Errors
///
/// Returns [`RunError`] when setup fails, the loop aborts, or the worker
/// cannot be stopped.
pub fn supervise<L>(loader: &L, args: &[OsString]) -> Result<SessionOutcome, RunError>
where
    L: ConfigLoader + ?Sized,
{
    let ArgumentSplit {
        config_arguments,
        worker_arguments,
    } = split_arguments(args);
    let config = loader
        .load(&config_arguments)
        .map_err(|source| RunError::Config { source })?;
    telemetry::initialise(&config).map_err(|source| RunError::Telemetry { source })?;
    let mut signals = SignalRelay::install()?;

    let command = WorkerCommand::from_config(&config, worker_arguments);
    let mut facade = ControlFacade::new(ProcessSupervisor::spawn(&command)?);
    facade.subscribe(LogObserver);

    let session = run_session(&mut facade, &mut signals, &mut NoCommands);
    let stopped = facade.shutdown();
    let outcome = session.map_err(|source| RunError::Session { source })?;
    stopped.map_err(|source| RunError::Shutdown { source })?;
    Ok(outcome)
}

fn emit<W: Write>(stderr: &mut W, message: &str) {
    let written = if message.ends_with('\n') {
        stderr.write_all(message.as_bytes())
    } else {
        writeln!(stderr, "{message}")
    };
    if let Err(error) = written.and_then(|()| stderr.flush()) {
        warn!(target: RUN_TARGET, %error, "failed to write to stderr");
    }
}

#[cfg(test)]
mod tests;
