//! Last-known worker state mirrored from report lines.

use std::fmt;

use serde::Serialize;

use crate::decoder::WorkerEvent;

/// Period label used before the worker reports one.
const UNKNOWN_PERIOD: &str = "Unknown";

/// Geographic position reported by the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Location {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Snapshot of everything the worker has reported so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerState {
    /// Whether the worker reported itself enabled.
    pub enabled: bool,
    /// Applied colour temperature in kelvin; zero until reported.
    pub temperature_kelvin: u32,
    /// Period label such as `Daytime`.
    pub period: String,
    /// Coordinates the worker computes against.
    pub location: Location,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self {
            enabled: false,
            temperature_kelvin: 0,
            period: UNKNOWN_PERIOD.to_owned(),
            location: Location::default(),
        }
    }
}

impl WorkerState {
    /// Applies a decoded event, overwriting the field it reports.
    pub fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Status { enabled } => self.enabled = enabled,
            WorkerEvent::Temperature(kelvin) => self.temperature_kelvin = kelvin,
            WorkerEvent::Period(period) => self.period = period,
            WorkerEvent::Location(location) => self.location = location,
        }
    }

    /// Human-readable status word.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.enabled { "Enabled" } else { "Disabled" }
    }
}

/// Renders the four-line status report shown by info panels.
impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status_label())?;
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Color temperature: {}K", self.temperature_kelvin)?;
        write!(f, "Period: {}", self.period)
    }
}
