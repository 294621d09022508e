//! Asynchronous signal intake for the supervisor loop.
//!
//! Handlers only record delivery; the loop drains pending signals between
//! iterations and acts on them from ordinary code.

use std::io;
use std::os::raw::c_int;

use signal_hook::consts::signal::{SIGCHLD, SIGINT, SIGTERM, SIGUSR1};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{debug, info};

/// Tracing target for signal intake.
pub(crate) const SIGNALS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::signals");

/// Signal forwarded verbatim to the worker.
pub const RELAY_SIGNAL: c_int = SIGUSR1;

/// Signals that end the session.
pub const SHUTDOWN_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Errors raised while installing handlers.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Registering handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Signals observed since the previous drain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingSignals {
    /// First shutdown signal received, if any.
    pub shutdown: Option<c_int>,
    /// Number of relay signals to forward to the worker.
    pub relays: usize,
    /// Whether a child changed state.
    pub child_exited: bool,
}

impl PendingSignals {
    /// Folds one delivered signal into the summary.
    pub fn record(&mut self, signal: c_int) {
        match signal {
            RELAY_SIGNAL => self.relays += 1,
            SIGCHLD => self.child_exited = true,
            other if SHUTDOWN_SIGNALS.contains(&other) => {
                self.shutdown.get_or_insert(other);
            }
            other => debug!(target: SIGNALS_TARGET, signal = other, "ignoring signal"),
        }
    }
}

/// Non-blocking supplier of delivered signals.
pub trait SignalSource {
    /// Collects every signal delivered since the last call.
    fn drain(&mut self) -> PendingSignals;
}

/// Process-wide handler registration for shutdown, relay, and child signals.
pub struct SignalRelay {
    signals: Signals,
}

impl SignalRelay {
    /// Installs handlers for `SIGINT`, `SIGTERM`, `SIGUSR1`, and `SIGCHLD`.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Install`] when registration fails.
    pub fn install() -> Result<Self, SignalError> {
        let signals = Signals::new([SIGINT, SIGTERM, RELAY_SIGNAL, SIGCHLD])
            .map_err(|source| SignalError::Install { source })?;
        Ok(Self { signals })
    }
}

impl SignalSource for SignalRelay {
    fn drain(&mut self) -> PendingSignals {
        let mut pending = PendingSignals::default();
        for signal in self.signals.pending() {
            pending.record(signal);
        }
        if let Some(signal) = pending.shutdown {
            info!(target: SIGNALS_TARGET, signal, "shutdown signal received");
        }
        pending
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        self.signals.handle().close();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use signal_hook::consts::signal::SIGHUP;

    use super::*;

    #[rstest]
    fn summarises_delivered_signals() {
        let mut pending = PendingSignals::default();
        for signal in [SIGUSR1, SIGCHLD, SIGTERM, SIGUSR1, SIGINT, SIGHUP] {
            pending.record(signal);
        }
        assert_eq!(
            pending,
            PendingSignals {
                shutdown: Some(SIGTERM),
                relays: 2,
                child_exited: true,
            }
        );
    }

    #[rstest]
    fn fresh_relay_has_nothing_pending() {
        let mut relay = SignalRelay::install().expect("handlers should install");
        assert!(relay.drain().shutdown.is_none());
    }
}
