//! Worker process lifecycle: launch, pipe reads, signalling, and exit.

mod command;
mod errors;
mod exit;
mod stream;
mod supervisor;

pub use command::{LOCALE_VARIABLES, WorkerCommand};
pub use errors::{SpawnError, SupervisorError};
pub use exit::{ExitClassification, ExitReport, FailureReport};
pub use stream::{ReadStatus, StreamKind};
pub use supervisor::{ProcessSupervisor, ReadBatch};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Upper bound on bytes consumed from one stream per readiness callback.
pub const READ_CHUNK: usize = 256;
