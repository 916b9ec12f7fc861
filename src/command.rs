use crate::env::ShellState;
use anyhow::Result;
use std::io::Write;

/// Object-safe trait for a command the interpreter runs in-process.
///
/// Implemented for every built-in through a blanket impl.
pub trait ExecutableCommand {
    /// Runs the command, writing regular output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
