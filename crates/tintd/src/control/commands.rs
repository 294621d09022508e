//! Requests queued by glue code for the control thread.

use std::collections::VecDeque;
use std::num::NonZeroU32;

/// A user intent delivered to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Flip the worker's enabled state.
    Toggle,
    /// Request a specific enabled state.
    SetEnabled(bool),
    /// Disable for the given number of minutes.
    SuspendFor(NonZeroU32),
    /// End the session.
    Quit,
}

/// Non-blocking supplier of [`ControlCommand`]s.
pub trait CommandSource {
    /// Next queued command, if one is ready.
    fn next_command(&mut self) -> Option<ControlCommand>;
}

/// Source that never yields a command.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn next_command(&mut self) -> Option<ControlCommand> {
        None
    }
}

impl CommandSource for VecDeque<ControlCommand> {
    fn next_command(&mut self) -> Option<ControlCommand> {
        self.pop_front()
    }
}
