use crate::error::ShellError;
use crate::parser::{ParsedCommand, Redirect, RedirectKind};
use log::debug;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Everything needed to start one external program.
///
/// Built fresh for every line, so a redirection never outlives the command it was written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Resolved executable; also passed to the program as `argv[0]`.
    pub program: PathBuf,
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
    /// Working directory of the child. Relative redirection targets are taken from here too.
    pub current_dir: PathBuf,
}

impl LaunchConfig {
    pub fn new(program: PathBuf, parsed: &ParsedCommand, current_dir: &Path) -> Self {
        Self {
            program,
            args: parsed.args.clone(),
            redirect: parsed.redirect.clone(),
            current_dir: current_dir.to_path_buf(),
        }
    }
}

/// A running child process. [`Handle::wait`] is the only blocking operation.
#[derive(Debug)]
pub struct Handle {
    child: Child,
    program: PathBuf,
}

impl Handle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the child has exited or was killed by a signal, and reaps it.
    pub fn wait(mut self) -> Result<ExitStatus, ShellError> {
        let pid = self.child.id();
        let status = self
            .child
            .wait()
            .map_err(|source| ShellError::Wait { pid, source })?;
        debug!(
            "{} (pid {}) finished with code {}",
            self.program.display(),
            pid,
            exit_code(status)
        );
        Ok(status)
    }
}

/// Starts the program described by `config`.
///
/// The redirection file is opened here, handed to the child as stdin (`<`) or
/// stdout (`>`, `>>`), and closed in the interpreter once the child is started or
/// the start failed. Standard error is never redirected.
pub fn spawn(config: &LaunchConfig) -> Result<Handle, ShellError> {
    let mut cmd = Command::new(&config.program);
    cmd.args(&config.args).current_dir(&config.current_dir);

    if let Some(redirect) = &config.redirect {
        let file = open_redirect(redirect, &config.current_dir)?;
        match redirect.kind {
            RedirectKind::Input => cmd.stdin(Stdio::from(file)),
            RedirectKind::Output | RedirectKind::Append => cmd.stdout(Stdio::from(file)),
        };
    }

    let spawned = cmd.spawn();
    // Drops the parent's copy of the redirection descriptor.
    drop(cmd);
    let child = spawned.map_err(|source| ShellError::Spawn {
        program: config.program.clone(),
        source,
    })?;
    debug!("started {} as pid {}", config.program.display(), child.id());
    Ok(Handle {
        child,
        program: config.program.clone(),
    })
}

fn open_redirect(redirect: &Redirect, current_dir: &Path) -> Result<File, ShellError> {
    let target = redirect
        .target
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(ShellError::MissingRedirectTarget)?;
    let path = current_dir.join(target);

    let mut options = OpenOptions::new();
    match redirect.kind {
        RedirectKind::Input => options.read(true),
        RedirectKind::Output => options.write(true).create(true).truncate(true),
        RedirectKind::Append => options.append(true).create(true),
    };
    options
        .open(&path)
        .map_err(|source| ShellError::Redirect { path, source })
}

/// Shell-style exit code: the process code, or 128 + signal when it was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
