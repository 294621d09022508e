//! Separates configuration flags from arguments forwarded to the worker.
//!
//! Configuration flags (listed in [`CONFIG_CLI_FLAGS`]) must precede worker
//! arguments. Recognition stops at the first argument that is not a known
//! flag or its value; a literal `--` also stops it and is itself dropped.

use std::ffi::{OsStr, OsString};

use tint_config::CONFIG_CLI_FLAGS;

const END_OF_FLAGS: &str = "--";

/// Arguments partitioned between the configuration loader and the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSplit {
    /// Program name followed by recognised configuration flags and values.
    pub config_arguments: Vec<OsString>,
    /// Remaining arguments, forwarded verbatim to the worker.
    pub worker_arguments: Vec<OsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    EndOfFlags,
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if text == END_OF_FLAGS {
        return FlagAction::EndOfFlags;
    }
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, has_inline_value) = text
        .split_once('=')
        .map_or_else(|| (text.as_ref(), false), |(flag, _)| (flag, true));
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Splits `args` (including the program name) into loader and worker parts.
#[must_use]
pub fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut index = 0;
    while let Some(argument) = rest.get(index) {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                index += 1;
                if let Some(value) = rest.get(index).filter(|_| needs_value) {
                    config_arguments.push(value.clone());
                    index += 1;
                }
            }
            FlagAction::EndOfFlags => {
                index += 1;
                break;
            }
            FlagAction::Stop => break,
        }
    }
    ArgumentSplit {
        config_arguments,
        worker_arguments: rest.iter().skip(index).cloned().collect(),
    }
}
