//! Decoding of `Key: Value` report lines into typed events.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::PROTOCOL_TARGET;
use crate::state::Location;

static RECORD_PATTERN: LazyLock<Regex> = LazyLock::new(record_pattern);

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
fn record_pattern() -> Regex {
    Regex::new(r"^([\w ]+): (.+)$").expect("record pattern must compile")
}

/// A raw `Key: Value` record borrowed from a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Word characters and spaces preceding the first `": "`.
    pub key: &'a str,
    /// Everything after the separator.
    pub value: &'a str,
}

/// State change reported by the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// `Status`: whether the worker is currently applying its adjustment.
    Status {
        /// `false` only when the worker reported `Disabled`.
        enabled: bool,
    },
    /// `Color temperature`: the temperature currently applied, in kelvin.
    Temperature(u32),
    /// `Period`: free-form label such as `Daytime` or `Night`.
    Period(String),
    /// `Location`: the coordinates the worker computes against.
    Location(Location),
}

/// Splits a line into its key and value when it has the record shape.
///
/// Lines without the shape yield `None`; they are not errors.
#[must_use]
pub fn parse_record(line: &str) -> Option<Record<'_>> {
    let captures = RECORD_PATTERN.captures(line)?;
    let key = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    Some(Record { key, value })
}

/// Decodes a report line into an event.
///
/// Malformed lines, unknown keys, and values that fail to parse all yield
/// `None` so that newer workers can add fields without breaking older
/// supervisors.
#[must_use]
pub fn decode(line: &str) -> Option<WorkerEvent> {
    let record = parse_record(line)?;
    let event = WorkerEvent::from_record(record);
    if event.is_none() {
        debug!(
            target: PROTOCOL_TARGET,
            key = record.key,
            value = record.value,
            "ignoring report record"
        );
    }
    event
}

impl WorkerEvent {
    /// Maps a record onto the event for its key.
    #[must_use]
    pub fn from_record(record: Record<'_>) -> Option<Self> {
        match record.key {
            "Status" => Some(Self::Status {
                enabled: record.value != "Disabled",
            }),
            "Color temperature" => parse_temperature(record.value).map(Self::Temperature),
            "Period" => Some(Self::Period(record.value.to_owned())),
            "Location" => parse_location(record.value).map(Self::Location),
            _ => None,
        }
    }
}

fn parse_temperature(value: &str) -> Option<u32> {
    value.trim_end_matches('K').parse().ok()
}

fn parse_location(value: &str) -> Option<Location> {
    let (latitude, longitude) = value.split_once(", ")?;
    Some(Location {
        latitude: latitude.parse().ok()?,
        longitude: longitude.parse().ok()?,
    })
}
