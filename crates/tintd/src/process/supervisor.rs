//! Owns the running worker and its two output pipes.

use std::io;
use std::os::fd::BorrowedFd;
use std::process::{Child, ChildStderr, ChildStdout, ExitStatus};

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tint_protocol::{WorkerEvent, decode};
use tracing::{debug, info, warn};

use super::command::WorkerCommand;
use super::errors::{SpawnError, SupervisorError};
use super::exit::{ExitClassification, ExitReport, FailureReport};
use super::stream::{ReadStatus, StreamChannel, StreamKind};
use super::{PROCESS_TARGET, READ_CHUNK};
use crate::control::WorkerControl;

/// Events decoded from one read along with the state of the pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadBatch {
    /// Events decoded from completed stdout lines. Always empty for stderr.
    pub events: Vec<WorkerEvent>,
    /// Outcome of the read.
    pub status: ReadStatus,
}

/// Supervises a single worker process.
///
/// Standard output is decoded into [`WorkerEvent`]s; standard error is
/// accumulated verbatim so it can be surfaced if the worker fails. Dropping the
/// supervisor terminates a worker that is still running.
#[derive(Debug)]
pub struct ProcessSupervisor {
    program: String,
    child: Child,
    stdout: StreamChannel<ChildStdout>,
    stderr: StreamChannel<ChildStderr>,
    error_log: String,
    exit: Option<ExitStatus>,
}

impl ProcessSupervisor {
    /// Launches the worker with both output streams captured.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError`] when the executable is missing, the OS refuses to
    /// start it, or its pipes cannot be prepared for non-blocking reads.
    pub fn spawn(command: &WorkerCommand) -> Result<Self, SpawnError> {
        let program = command.program().to_string_lossy().into_owned();
        let mut child = command.to_command().spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SpawnError::NotFound {
                    program: program.clone(),
                }
            } else {
                SpawnError::Launch {
                    program: program.clone(),
                    source,
                }
            }
        })?;

        let (stdout, stderr) = match take_pipes(&mut child) {
            Ok(pipes) => pipes,
            Err(stream) => {
                abandon(&mut child);
                return Err(SpawnError::MissingPipe { stream });
            }
        };

        let supervisor = Self {
            program,
            child,
            stdout: StreamChannel::new(stdout),
            stderr: StreamChannel::new(stderr),
            error_log: String::new(),
            exit: None,
        };
        supervisor
            .stdout
            .set_nonblocking()
            .map_err(|source| SpawnError::NonBlocking {
                stream: StreamKind::Stdout,
                source,
            })?;
        supervisor
            .stderr
            .set_nonblocking()
            .map_err(|source| SpawnError::NonBlocking {
                stream: StreamKind::Stderr,
                source,
            })?;

        info!(
            target: PROCESS_TARGET,
            pid = supervisor.pid(),
            program = %supervisor.program,
            arguments = ?command.arguments(),
            "worker launched"
        );
        Ok(supervisor)
    }

    /// Operating-system process id of the worker.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Program name used in logs and failure reports.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Descriptor to poll for `kind`, or `None` once that pipe has closed.
    #[must_use]
    pub fn poll_fd(&self, kind: StreamKind) -> Option<BorrowedFd<'_>> {
        match kind {
            StreamKind::Stdout => self.stdout.poll_fd(),
            StreamKind::Stderr => self.stderr.poll_fd(),
        }
    }

    /// Standard-error text collected so far.
    #[must_use]
    pub fn error_log(&self) -> &str {
        &self.error_log
    }

    /// Whether the worker's exit status has been collected.
    #[must_use]
    pub const fn has_exited(&self) -> bool {
        self.exit.is_some()
    }

    /// Reads at most one chunk from `kind` after it signalled readiness.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Read`] when the read fails for any reason
    /// other than the pipe being temporarily empty.
    pub fn on_readable(&mut self, kind: StreamKind) -> Result<ReadBatch, SupervisorError> {
        let mut buf = [0_u8; READ_CHUNK];
        let read = match kind {
            StreamKind::Stdout => self.stdout.read_chunk(&mut buf),
            StreamKind::Stderr => self.stderr.read_chunk(&mut buf),
        };
        let (status, lines) = read.map_err(|source| SupervisorError::Read {
            stream: kind,
            source,
        })?;
        if status == ReadStatus::Closed {
            debug!(target: PROCESS_TARGET, stream = %kind, "worker pipe closed");
        }
        let events = self.consume(kind, lines);
        Ok(ReadBatch { events, status })
    }

    /// Reads `kind` until it would block or closes.
    ///
    /// # Errors
    ///
    /// Propagates the first read failure.
    pub fn drain(&mut self, kind: StreamKind) -> Result<Vec<WorkerEvent>, SupervisorError> {
        let mut events = Vec::new();
        loop {
            let batch = self.on_readable(kind)?;
            events.extend(batch.events);
            if !matches!(batch.status, ReadStatus::Data(_)) {
                return Ok(events);
            }
        }
    }

    /// Collects the exit status without blocking.
    ///
    /// Yields `Some` exactly once, on the first call after the worker exits.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Wait`] when the status cannot be queried.
    pub fn try_reap(&mut self) -> Result<Option<ExitStatus>, SupervisorError> {
        if self.exit.is_some() {
            return Ok(None);
        }
        let status = self
            .child
            .try_wait()
            .map_err(|source| SupervisorError::Wait {
                pid: self.child.id(),
                source,
            })?;
        self.exit = status;
        Ok(status)
    }

    /// Finishes the run after the worker exited with `status`.
    ///
    /// Both pipes are drained first. An unterminated stderr tail is appended to
    /// the error log as-is and an unterminated stdout tail is decoded as a
    /// final line.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the final drain.
    pub fn on_exit(&mut self, status: ExitStatus) -> Result<ExitReport, SupervisorError> {
        let mut events = self.drain(StreamKind::Stdout)?;
        self.drain(StreamKind::Stderr)?;
        if let Some(tail) = self.stderr.take_remainder() {
            self.error_log.push_str(&tail);
        }
        if let Some(tail) = self.stdout.take_remainder() {
            events.extend(decode(&tail));
        }

        let pid = self.pid();
        let classification = FailureReport::from_status(&self.program, status, &self.error_log)
            .map_or_else(
                || {
                    info!(target: PROCESS_TARGET, pid, "worker exited");
                    ExitClassification::Clean
                },
                |report| {
                    warn!(
                        target: PROCESS_TARGET,
                        pid,
                        status = report.status(),
                        "worker failed"
                    );
                    ExitClassification::Failed(report)
                },
            );
        Ok(ExitReport {
            events,
            classification,
        })
    }

    /// Forwards `signal` to the worker.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Signal`] when delivery fails for a reason
    /// other than the worker having already exited.
    pub fn relay_signal(&self, signal: Signal) -> Result<(), SupervisorError> {
        if self.exit.is_some() {
            debug!(target: PROCESS_TARGET, %signal, "worker already exited; signal dropped");
            return Ok(());
        }
        let pid = self.pid();
        let target = i32::try_from(pid)
            .map(Pid::from_raw)
            .map_err(|_| SupervisorError::Signal {
                pid,
                signal,
                source: Errno::EINVAL,
            })?;
        match kill(target, signal) {
            Ok(()) => {
                debug!(target: PROCESS_TARGET, pid, %signal, "signal delivered");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                warn!(target: PROCESS_TARGET, pid, %signal, "worker vanished before signal");
                Ok(())
            }
            Err(source) => Err(SupervisorError::Signal {
                pid,
                signal,
                source,
            }),
        }
    }

    fn consume(&mut self, kind: StreamKind, lines: Vec<String>) -> Vec<WorkerEvent> {
        match kind {
            StreamKind::Stdout => lines.iter().filter_map(|line| decode(line)).collect(),
            StreamKind::Stderr => {
                for line in lines {
                    debug!(target: PROCESS_TARGET, %line, "worker stderr");
                    self.error_log.push_str(&line);
                    self.error_log.push('\n');
                }
                Vec::new()
            }
        }
    }
}

impl WorkerControl for ProcessSupervisor {
    fn send_control_signal(&mut self) -> Result<(), SupervisorError> {
        self.relay_signal(Signal::SIGUSR1)
    }

    fn terminate(&mut self) -> Result<(), SupervisorError> {
        if self.exit.is_some() {
            return Ok(());
        }
        self.relay_signal(Signal::SIGINT)?;
        let pid = self.pid();
        let status = self
            .child
            .wait()
            .map_err(|source| SupervisorError::Wait { pid, source })?;
        self.exit = Some(status);
        info!(target: PROCESS_TARGET, pid, %status, "worker terminated");
        Ok(())
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Err(error) = WorkerControl::terminate(self) {
            warn!(target: PROCESS_TARGET, %error, "failed to terminate worker on drop");
        }
    }
}

fn take_pipes(child: &mut Child) -> Result<(ChildStdout, ChildStderr), StreamKind> {
    let stdout = child.stdout.take().ok_or(StreamKind::Stdout)?;
    let stderr = child.stderr.take().ok_or(StreamKind::Stderr)?;
    Ok((stdout, stderr))
}

fn abandon(child: &mut Child) {
    if let Err(error) = child.kill() {
        warn!(target: PROCESS_TARGET, %error, "failed to kill worker");
    }
    if let Err(error) = child.wait() {
        warn!(target: PROCESS_TARGET, %error, "failed to reap worker");
    }
}
