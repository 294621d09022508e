//! Process supervision against real shell workers.

use std::time::{Duration, Instant};

use rstest::rstest;
use tint_protocol::WorkerEvent;

use super::support::{shell_worker, spawn_script, wait_for_exit};
use crate::{
    ExitClassification, FailureReport, ProcessSupervisor, ReadStatus, SpawnError, StreamKind,
    WorkerCommand, WorkerControl,
};

fn failure_of(classification: ExitClassification) -> FailureReport {
    match classification {
        ExitClassification::Failed(report) => report,
        ExitClassification::Clean => panic!("expected a failed exit"),
    }
}

#[rstest]
fn missing_executable_is_reported_not_found() {
    let error = ProcessSupervisor::spawn(&WorkerCommand::new("/nonexistent/tint-worker"))
        .expect_err("spawn must fail");
    assert!(
        matches!(error, SpawnError::NotFound { ref program } if program == "/nonexistent/tint-worker"),
        "unexpected error: {error}"
    );
}

#[rstest]
fn worker_runs_under_the_forced_locale() {
    let mut supervisor = ProcessSupervisor::spawn(
        &shell_worker(r#"printf 'Period: %s\n' "$LC_ALL""#).locale("POSIX"),
    )
    .expect("shell worker should launch");
    let status = wait_for_exit(&mut supervisor);
    let report = supervisor.on_exit(status).expect("exit handling");
    assert_eq!(report.events, vec![WorkerEvent::Period(String::from("POSIX"))]);
    assert_eq!(report.classification, ExitClassification::Clean);
}

#[rstest]
fn non_zero_exit_surfaces_exact_stderr() {
    let mut supervisor = spawn_script("printf 'fatal error\\n' >&2; exit 1");
    let status = wait_for_exit(&mut supervisor);
    let report = failure_of(supervisor.on_exit(status).expect("exit handling").classification);
    assert_eq!(report.errors(), "fatal error\n");
    assert_eq!(report.status(), "exit status 1");
    assert_eq!(report.program(), "/bin/sh");
}

#[rstest]
fn unterminated_stderr_tail_is_kept_verbatim() {
    let mut supervisor = spawn_script("printf 'first\\nno newline' >&2; exit 2");
    let status = wait_for_exit(&mut supervisor);
    let report = failure_of(supervisor.on_exit(status).expect("exit handling").classification);
    assert_eq!(report.errors(), "first\nno newline");
}

#[rstest]
fn signal_death_is_a_failure() {
    let mut supervisor = spawn_script("kill -9 $$");
    let status = wait_for_exit(&mut supervisor);
    let report = failure_of(supervisor.on_exit(status).expect("exit handling").classification);
    assert_eq!(report.status(), "terminated by signal 9 (SIGKILL)");
}

#[rstest]
fn reap_reports_exit_only_once() {
    let mut supervisor = spawn_script("exit 0");
    wait_for_exit(&mut supervisor);
    assert!(supervisor.try_reap().expect("second reap").is_none());
    assert!(supervisor.has_exited());
}

#[rstest]
fn empty_pipe_would_block_instead_of_stalling() {
    let mut supervisor = spawn_script("exec sleep 30");
    let batch = supervisor
        .on_readable(StreamKind::Stdout)
        .expect("read should not fail");
    assert_eq!(batch.status, ReadStatus::WouldBlock);
    assert!(batch.events.is_empty());
    WorkerControl::terminate(&mut supervisor).expect("terminate");
}

#[rstest]
fn terminate_interrupts_and_reaps() {
    let mut supervisor = spawn_script("exec sleep 30");
    let started = Instant::now();
    WorkerControl::terminate(&mut supervisor).expect("terminate");
    assert!(supervisor.has_exited());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[rstest]
fn terminate_after_exit_is_success() {
    let mut supervisor = spawn_script("exit 0");
    wait_for_exit(&mut supervisor);
    WorkerControl::terminate(&mut supervisor).expect("terminating an exited worker succeeds");
    WorkerControl::send_control_signal(&mut supervisor)
        .expect("signalling an exited worker succeeds");
}

#[rstest]
fn control_signal_reaches_the_worker() {
    let mut supervisor = spawn_script(
        "trap 'echo \"Status: Disabled\"; exit 0' USR1; echo 'Period: ready'; \
         while :; do sleep 1; done",
    );
    let ready = WorkerEvent::Period(String::from("ready"));
    let deadline = Instant::now() + Duration::from_secs(5);
    while !supervisor
        .drain(StreamKind::Stdout)
        .expect("drain stdout")
        .contains(&ready)
    {
        assert!(Instant::now() < deadline, "worker never became ready");
        std::thread::sleep(Duration::from_millis(10));
    }

    WorkerControl::send_control_signal(&mut supervisor).expect("signal delivered");
    let status = wait_for_exit(&mut supervisor);
    let report = supervisor.on_exit(status).expect("exit handling");
    assert_eq!(report.events, vec![WorkerEvent::Status { enabled: false }]);
    assert_eq!(report.classification, ExitClassification::Clean);
}

#[rstest]
fn stderr_lines_accumulate_while_running() {
    let mut supervisor =
        spawn_script("printf 'warming up\\nstill going\\n' >&2; exec sleep 30");
    let deadline = Instant::now() + Duration::from_secs(5);
    while supervisor.error_log() != "warming up\nstill going\n" {
        assert!(Instant::now() < deadline, "stderr never arrived");
        let batch = supervisor
            .on_readable(StreamKind::Stderr)
            .expect("read should not fail");
        assert!(batch.events.is_empty(), "stderr never yields events");
        std::thread::sleep(Duration::from_millis(10));
    }
    WorkerControl::terminate(&mut supervisor).expect("terminate");
}
