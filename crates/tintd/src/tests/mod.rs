//! Test suites for the supervision core.

mod process;
mod support;
