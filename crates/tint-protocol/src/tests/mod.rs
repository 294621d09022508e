//! Test suites for the worker report protocol.

mod decoder;
mod state;
