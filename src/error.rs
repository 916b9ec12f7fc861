use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the interpreter reports for a single line.
///
/// None of these stop the read loop: the line is skipped and the next one is read.
#[derive(Debug, Error)]
pub enum ShellError {
    /// No search-path directory holds an executable with this name.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("cd: missing operand")]
    MissingDirectory,

    #[error("cd: {}: {source}", .target.display())]
    ChangeDir {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open {}: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A redirection operator was the last token of the line.
    #[error("missing redirection target")]
    MissingRedirectTarget,

    #[error("{name}: redirection is not supported for built-in commands")]
    BuiltinRedirect { name: String },

    /// The child could not be created or its program could not be started.
    #[error("{}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wait for pid {pid} failed: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("path: too many entries ({count}, at most {max})")]
    TooManyEntries { count: usize, max: usize },

    #[error("path: entry is longer than {max} bytes")]
    EntryTooLong { max: usize },

    /// A script line is not valid UTF-8; the line is skipped.
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },

    /// Built-in argument parsing rejected the invocation.
    #[error("{0}")]
    Usage(String),
}
