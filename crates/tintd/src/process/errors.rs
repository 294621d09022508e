//! Error surface for worker launch and supervision.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;

use super::stream::StreamKind;

/// Errors raised while launching the worker. Launch is never retried.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The executable could not be found.
    #[error("worker executable '{program}' not found")]
    NotFound {
        /// Executable as configured.
        program: String,
    },
    /// The operating system refused to create the process.
    #[error("failed to launch worker '{program}': {source}")]
    Launch {
        /// Executable as configured.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// A requested pipe was not attached to the child.
    #[error("worker {stream} pipe was not captured")]
    MissingPipe {
        /// Stream lacking a pipe.
        stream: StreamKind,
    },
    /// Switching a pipe to non-blocking mode failed.
    #[error("failed to make worker {stream} non-blocking: {source}")]
    NonBlocking {
        /// Stream being configured.
        stream: StreamKind,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
}

/// Errors raised while the worker is running.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Reading from a worker pipe failed.
    #[error("failed to read worker {stream}: {source}")]
    Read {
        /// Stream being read.
        stream: StreamKind,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Delivering a signal to the worker failed.
    #[error("failed to send {signal} to worker {pid}: {source}")]
    Signal {
        /// Worker process id.
        pid: u32,
        /// Signal being delivered.
        signal: Signal,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// Waiting for the worker's exit status failed.
    #[error("failed to wait for worker {pid}: {source}")]
    Wait {
        /// Worker process id.
        pid: u32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
