use crate::search_path::SearchPath;
use std::env as stdenv;
use std::path::PathBuf;

/// Process-wide state the interpreter owns for the whole run.
///
/// - `search_path`: directories consulted to resolve external commands.
/// - `current_dir`: working directory of the interpreter, and of every child it starts.
/// - `should_exit`: set by `exit`; the read loop stops once it is true.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub search_path: SearchPath,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl ShellState {
    /// Capture the current process state with the default search path.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            search_path: SearchPath::default(),
            current_dir,
            should_exit: false,
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}
