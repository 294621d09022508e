//! Entry point for the `tintd` supervisor.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    tintd::run(std::env::args_os(), &mut io::stderr())
}
