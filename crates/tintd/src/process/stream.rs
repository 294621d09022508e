//! Non-blocking reads from one worker pipe.

use std::fmt;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use tint_protocol::LineSplitter;

/// Which worker pipe a read concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Report lines.
    Stdout,
    /// Diagnostics collected for failure reports.
    Stderr,
}

impl StreamKind {
    /// Both streams in polling order.
    pub const ALL: [Self; 2] = [Self::Stdout, Self::Stderr];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Result of a single read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Bytes were consumed.
    Data(usize),
    /// Nothing is available right now.
    WouldBlock,
    /// The peer closed the pipe; no further reads are attempted.
    Closed,
}

/// A pipe paired with the splitter that reassembles its lines.
#[derive(Debug)]
pub(crate) struct StreamChannel<P> {
    pipe: Option<P>,
    lines: LineSplitter,
}

impl<P> StreamChannel<P>
where
    P: Read + AsFd,
{
    pub(crate) const fn new(pipe: P) -> Self {
        Self {
            pipe: Some(pipe),
            lines: LineSplitter::new(),
        }
    }

    pub(crate) fn set_nonblocking(&self) -> Result<(), Errno> {
        let Some(pipe) = self.pipe.as_ref() else {
            return Ok(());
        };
        let fd = pipe.as_fd().as_raw_fd();
        let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
        fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
        Ok(())
    }

    pub(crate) fn poll_fd(&self) -> Option<BorrowedFd<'_>> {
        self.pipe.as_ref().map(AsFd::as_fd)
    }

    /// Reads at most one chunk and returns the lines it completed.
    ///
    /// A read interrupted by a signal is retried.
    pub(crate) fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<(ReadStatus, Vec<String>)> {
        let Some(pipe) = self.pipe.as_mut() else {
            return Ok((ReadStatus::Closed, Vec::new()));
        };
        match read_retrying(pipe, buf) {
            Ok(0) => {
                self.pipe = None;
                Ok((ReadStatus::Closed, Vec::new()))
            }
            Ok(count) => {
                let chunk = buf.get(..count).unwrap_or_default();
                Ok((ReadStatus::Data(count), self.lines.feed(chunk).collect()))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                Ok((ReadStatus::WouldBlock, Vec::new()))
            }
            Err(error) => Err(error),
        }
    }

    pub(crate) fn take_remainder(&mut self) -> Option<String> {
        self.lines.take_remainder()
    }
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}
