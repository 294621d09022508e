//! Launch description for the worker process.

use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use tint_config::Config;

/// Environment variables overridden so the worker reports in a parseable locale.
pub const LOCALE_VARIABLES: [&str; 4] = ["LANG", "LANGUAGE", "LC_ALL", "LC_MESSAGES"];

/// Launch description for the worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: OsString,
    args: Vec<OsString>,
    locale: String,
}

impl WorkerCommand {
    /// Describes a worker launched from `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            locale: tint_config::DEFAULT_WORKER_LOCALE.to_owned(),
        }
    }

    /// Builds the launch description from configuration and forwarded arguments.
    #[must_use]
    pub fn from_config(config: &Config, args: Vec<OsString>) -> Self {
        let mut command = Self::new(config.worker_path())
            .args(args)
            .locale(config.worker_locale());
        if let Some(flag) = config.worker_verbose_flag() {
            command = command.ensure_flag(flag);
        }
        command
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Overrides the locale forced onto the worker.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Inserts `flag` as the first argument unless it is already present.
    #[must_use]
    pub fn ensure_flag(mut self, flag: &str) -> Self {
        if !self.args.iter().any(|arg| arg == flag) {
            self.args.insert(0, OsString::from(flag));
        }
        self
    }

    /// Executable to launch.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for variable in LOCALE_VARIABLES {
            command.env(variable, &self.locale);
        }
        command
    }
}
