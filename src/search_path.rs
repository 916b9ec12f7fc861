use crate::error::ShellError;
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// Directory searched when no `path` built-in has run yet.
pub const DEFAULT_DIR: &str = "/bin";

/// Upper bound on the number of directories in the search path.
pub const MAX_ENTRIES: usize = 64;

/// Upper bound on the length of a single directory, in bytes.
pub const MAX_ENTRY_LEN: usize = 4096;

/// Ordered list of directories consulted to turn a bare command name into an
/// executable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    /// Creates a search path from `dirs`, checking the same bounds as [`SearchPath::replace`].
    pub fn new<I, S>(dirs: I) -> Result<Self, ShellError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self { dirs: Vec::new() };
        path.replace(dirs)?;
        Ok(path)
    }

    /// Replaces every entry with `dirs` and returns how many were stored.
    ///
    /// An empty input is accepted and leaves a path that resolves nothing.
    /// Input over the bounds is rejected and the current entries are kept.
    pub fn replace<I, S>(&mut self, dirs: I) -> Result<usize, ShellError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dirs: Vec<String> = dirs.into_iter().map(Into::into).collect();
        if dirs.len() > MAX_ENTRIES {
            return Err(ShellError::TooManyEntries {
                count: dirs.len(),
                max: MAX_ENTRIES,
            });
        }
        if dirs.iter().any(|d| d.len() > MAX_ENTRY_LEN) {
            return Err(ShellError::EntryTooLong { max: MAX_ENTRY_LEN });
        }
        debug!("search path replaced: {:?} -> {:?}", self.dirs, dirs);
        self.dirs = dirs;
        Ok(self.dirs.len())
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Finds the first directory, in order, holding an executable named `command`.
    ///
    /// Relative directories are taken relative to the current working directory,
    /// and the returned path is always absolute.
    pub fn resolve(&self, command: &str) -> Result<PathBuf, ShellError> {
        if command.is_empty() {
            return Err(ShellError::CommandNotFound(command.to_string()));
        }
        for dir in &self.dirs {
            let candidate = PathBuf::from(format!("{}/{}", dir, command));
            if is_executable(&candidate) {
                let resolved = std::path::absolute(&candidate).unwrap_or(candidate);
                debug!("resolved {} -> {}", command, resolved.display());
                return Ok(resolved);
            }
            trace!("{} is not an executable", candidate.display());
        }
        Err(ShellError::CommandNotFound(command.to_string()))
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self {
            dirs: vec![DEFAULT_DIR.to_string()],
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
