//! State-changed notification sinks.

use tint_protocol::WorkerState;
use tracing::info;

use super::CONTROL_TARGET;

/// Receives the full state snapshot after every change.
pub trait StateObserver {
    /// Called with the updated state.
    fn state_changed(&mut self, state: &WorkerState);
}

/// Icon shown by a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    /// Worker enabled.
    On,
    /// Worker disabled.
    Off,
}

impl IconState {
    /// Icon matching `state`.
    #[must_use]
    pub const fn for_state(state: &WorkerState) -> Self {
        if state.enabled { Self::On } else { Self::Off }
    }
}

/// Presentation capability that can show an on/off icon.
pub trait StatusIndicator {
    /// Shows `icon`.
    fn set_icon_state(&mut self, icon: IconState);
}

/// Drives a [`StatusIndicator`] from state changes, updating it only when the
/// icon actually changes.
#[derive(Debug)]
pub struct IndicatorObserver<I> {
    indicator: I,
    shown: Option<IconState>,
}

impl<I: StatusIndicator> IndicatorObserver<I> {
    /// Wraps `indicator`; the first notification always updates it.
    #[must_use]
    pub const fn new(indicator: I) -> Self {
        Self {
            indicator,
            shown: None,
        }
    }
}

impl<I: StatusIndicator> StateObserver for IndicatorObserver<I> {
    fn state_changed(&mut self, state: &WorkerState) {
        let icon = IconState::for_state(state);
        if self.shown != Some(icon) {
            self.indicator.set_icon_state(icon);
            self.shown = Some(icon);
        }
    }
}

/// Logs each snapshot at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StateObserver for LogObserver {
    fn state_changed(&mut self, state: &WorkerState) {
        info!(
            target: CONTROL_TARGET,
            enabled = state.enabled,
            temperature = state.temperature_kelvin,
            period = %state.period,
            location = %state.location,
            "worker state changed"
        );
    }
}
