//! Line-oriented report protocol spoken by the supervised worker.
//!
//! The worker writes one `Key: Value` record per line on its standard output.
//! This crate turns raw pipe bytes into those records without performing any
//! I/O itself:
//!
//! 1. [`LineSplitter`] reassembles bytes that may arrive fragmented or batched
//!    into complete lines, carrying any unterminated tail across calls.
//! 2. [`decode`] matches a line against the record shape and maps recognised
//!    keys onto typed [`WorkerEvent`] values.
//! 3. [`WorkerState`] mirrors the last value reported for each field and
//!    applies events as they are decoded.
//!
//! ```
//! use tint_protocol::{LineSplitter, WorkerState, decode};
//!
//! let mut splitter = LineSplitter::new();
//! let mut state = WorkerState::default();
//! for line in splitter.feed(b"Status: Enabled\nColor temperature: 45") {
//!     if let Some(event) = decode(&line) {
//!         state.apply(event);
//!     }
//! }
//! for line in splitter.feed(b"00K\n") {
//!     if let Some(event) = decode(&line) {
//!         state.apply(event);
//!     }
//! }
//! assert!(state.enabled);
//! assert_eq!(state.temperature_kelvin, 4500);
//! ```

mod decoder;
mod splitter;
mod state;

pub use decoder::{Record, WorkerEvent, decode, parse_record};
pub use splitter::{LineSplitter, Lines};
pub use state::{Location, WorkerState};

/// Tracing target for protocol decoding.
pub(crate) const PROTOCOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::protocol");

#[cfg(test)]
mod tests;
