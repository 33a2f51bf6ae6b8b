//! Run commands on the host

use std::{io, process::Command};

/// What a finished command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output with surrounding whitespace trimmed
    pub stdout: String,

    /// Whether the command exited successfully
    pub success: bool,

    /// The exit code, `None` if the command was killed by a signal
    pub code: Option<i32>,
}

/// Something that can run a command line and report its output.
///
/// An `Err` means the command could not be run at all. A command that ran and
/// exited non-zero is an `Ok` with `success` unset.
pub trait Executor {
    /// Run `command` to completion.
    fn run(&self, command: &str) -> io::Result<CommandOutput>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn run(&self, command: &str) -> io::Result<CommandOutput> {
        (**self).run(command)
    }
}

/// Runs commands as child processes.
///
/// The command line is split on whitespace and executed directly, without a shell,
/// so unit names never pass through shell expansion.
#[derive(Debug, Default, Clone, Copy)]
pub struct Shell;

impl Executor for Shell {
    fn run(&self, command: &str) -> io::Result<CommandOutput> {
        let mut words = command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        tracing::trace!(%command, "Running command");
        let output = Command::new(program).args(words).output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}
