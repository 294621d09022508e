//! Shared helpers for tests that launch real shell workers.

use std::ffi::OsString;
use std::process::ExitStatus;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ortho_config::OrthoError;
use tint_config::Config;

use crate::{ConfigLoader, ProcessSupervisor, WorkerCommand};

pub(super) const SHELL: &str = "/bin/sh";

const EXIT_TIMEOUT: Duration = Duration::from_secs(5);
const EXIT_POLL: Duration = Duration::from_millis(10);

/// Worker that runs `script` under the shell.
pub(super) fn shell_worker(script: &str) -> WorkerCommand {
    WorkerCommand::new(SHELL).args(["-c", script])
}

pub(super) fn spawn_script(script: &str) -> ProcessSupervisor {
    ProcessSupervisor::spawn(&shell_worker(script)).expect("shell worker should launch")
}

/// Polls until the worker's exit status is collected.
pub(super) fn wait_for_exit(supervisor: &mut ProcessSupervisor) -> ExitStatus {
    let deadline = Instant::now() + EXIT_TIMEOUT;
    loop {
        if let Some(status) = supervisor.try_reap().expect("reap should succeed") {
            return status;
        }
        assert!(Instant::now() < deadline, "worker did not exit in time");
        thread::sleep(EXIT_POLL);
    }
}

/// Configuration that launches the shell without inserting a verbose flag.
pub(super) fn shell_config() -> Config {
    Config {
        worker_path: String::from(SHELL),
        worker_verbose_flag: String::new(),
        ..Config::default()
    }
}

/// Loader returning a fixed configuration.
pub(super) struct StaticLoader(pub(super) Config);

impl ConfigLoader for StaticLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        Ok(self.0.clone())
    }
}

/// Command line for `tintd` forwarding `script` to the shell.
pub(super) fn command_line(script: &str) -> Vec<OsString> {
    ["tintd", "-c", script].into_iter().map(OsString::from).collect()
}
