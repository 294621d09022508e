//! Classification of worker termination.

use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use nix::sys::signal::Signal;
use tint_protocol::WorkerEvent;

/// How the worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitClassification {
    /// Exited normally with status zero.
    Clean,
    /// Exited non-zero or was killed by a signal.
    Failed(FailureReport),
}

/// Everything learned when the worker exits.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitReport {
    /// Events decoded from output drained after the exit was observed.
    pub events: Vec<WorkerEvent>,
    /// Outcome of the run.
    pub classification: ExitClassification,
}

/// User-facing description of an abnormal worker exit.
///
/// Renders as `Failed to run <program> (<status>)` followed by the collected
/// standard-error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    program: String,
    status: String,
    errors: String,
}

impl FailureReport {
    /// Classifies `status`, returning a report for anything but a clean exit.
    pub(crate) fn from_status(program: &str, status: ExitStatus, errors: &str) -> Option<Self> {
        let description = describe_status(status)?;
        Some(Self {
            program: program.to_owned(),
            status: description,
            errors: errors.to_owned(),
        })
    }

    /// Program that failed.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Human-readable exit status.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Standard-error text collected over the worker's lifetime.
    #[must_use]
    pub fn errors(&self) -> &str {
        &self.errors
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "Failed to run {} ({})", self.program, self.status)?;
        formatter.write_str(&self.errors)
    }
}

fn describe_status(status: ExitStatus) -> Option<String> {
    if let Some(code) = status.code() {
        return (code != 0).then(|| format!("exit status {code}"));
    }
    let description = status
        .signal()
        .map_or_else(|| String::from("terminated abnormally"), describe_signal);
    Some(description)
}

fn describe_signal(number: i32) -> String {
    Signal::try_from(number).map_or_else(
        |_| format!("terminated by signal {number}"),
        |signal| format!("terminated by signal {number} ({signal})"),
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn clean_exit_has_no_report() {
        assert!(FailureReport::from_status("redshift", ExitStatus::from_raw(0), "").is_none());
    }

    #[rstest]
    #[case(ExitStatus::from_raw(1 << 8), "exit status 1")]
    #[case(ExitStatus::from_raw(9), "terminated by signal 9 (SIGKILL)")]
    fn failures_describe_their_status(#[case] status: ExitStatus, #[case] expected: &str) {
        let report = FailureReport::from_status("redshift", status, "oops\n")
            .expect("non-zero status is a failure");
        assert_eq!(report.status(), expected);
    }

    #[rstest]
    fn renders_heading_then_errors() {
        let report = FailureReport::from_status(
            "redshift",
            ExitStatus::from_raw(1 << 8),
            "Unable to connect\nTry again\n",
        )
        .expect("non-zero status is a failure");
        assert_eq!(
            report.to_string(),
            "Failed to run redshift (exit status 1)\nUnable to connect\nTry again\n"
        );
    }
}
