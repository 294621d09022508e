//! Per-stream reassembly of newline-terminated lines.

use std::borrow::Cow;

use tracing::warn;

use crate::PROTOCOL_TARGET;

/// Accumulates bytes from one stream and yields complete lines.
///
/// Each stream owns its own splitter; bytes that are not yet terminated by a
/// newline stay buffered until a later [`feed`](Self::feed) completes them.
#[derive(Debug, Default, Clone)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    /// Creates an empty splitter.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Appends `bytes` and returns an iterator over the lines they complete.
    ///
    /// Lines are yielded without their terminating newline. Lines left unread
    /// when the iterator is dropped remain buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(bytes);
        Lines { splitter: self }
    }

    /// Bytes received but not yet terminated by a newline.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Takes the unterminated tail, leaving the splitter empty.
    ///
    /// Returns `None` when nothing is buffered.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.buffer);
        Some(decode_lossy(&tail))
    }

    fn next_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|byte| *byte == b'\n')?;
        let rest = self.buffer.split_off(newline + 1);
        let mut line = std::mem::replace(&mut self.buffer, rest);
        line.truncate(newline);
        Some(decode_lossy(&line))
    }
}

/// Lazy iterator over the complete lines held by a [`LineSplitter`].
#[derive(Debug)]
pub struct Lines<'a> {
    splitter: &'a mut LineSplitter,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.splitter.next_line()
    }
}

fn decode_lossy(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_owned(),
        Cow::Owned(text) => {
            warn!(
                target: PROTOCOL_TARGET,
                bytes = bytes.len(),
                "replaced invalid UTF-8 in worker output"
            );
            text
        }
    }
}
