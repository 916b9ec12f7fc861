use crate::command::{CommandFactory, ExecutableCommand};
use crate::env::ShellState;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process: they change state that a child process could not hand back.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "path".
    fn name() -> &'static str;

    /// Executes the command against the interpreter state.
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        <T as BuiltinCommand>::execute(*self, stdout, state)
    }
}

/// Result of argument parsing that did not produce a command: `--help` output or a usage error.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _state: &mut ShellState) -> Result<()> {
        if self.is_error {
            return Err(ShellError::Usage(self.output.trim_end().to_string()).into());
        }
        stdout.write_all(self.output.as_bytes())?;
        Ok(())
    }
}

/// Arguments as handed to argh: everything after `--`, so a dash-prefixed
/// directory is never read as a flag. A lone `--help` stays a flag.
fn positional_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
    match args {
        [] | ["--help"] => args.to_vec(),
        _ => std::iter::once("--").chain(args.iter().copied()).collect(),
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], &positional_args(args)) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the working directory of the shell.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => return Err(ShellError::MissingDirectory.into()),
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            state.current_dir.join(&target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|source| ShellError::ChangeDir {
            target: target.clone(),
            source,
        })?;
        env::set_current_dir(&canonical)
            .map_err(|source| ShellError::ChangeDir { target, source })?;
        debug!("working directory is now {}", canonical.display());
        state.current_dir = canonical;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Replace the search path used to find commands.
/// With no directories, only built-ins remain usable.
pub struct SetPath {
    #[argh(positional, greedy)]
    /// directories to search, in order.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for SetPath {
    fn name() -> &'static str {
        "path"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        state.search_path.replace(self.dirs)?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        state.should_exit = true;
        Ok(())
    }
}

pub(crate) const HELP: &str = "\
wish: a small command interpreter

usage: command [args...] [> file | >> file | < file]

built-in commands:
  cd <dir>          change the working directory
  path [dir...]     replace the command search path
  help              show this text
  exit              leave the shell

Other commands are looked up in the search path and run in the foreground.
Lines starting with '#' are ignored.
";

#[derive(FromArgs)]
/// Show usage of the shell.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _state: &mut ShellState) -> Result<()> {
        stdout.write_all(HELP.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_path::SearchPath;
    use crate::testing::{lock_current_dir, make_unique_temp_dir};
    use std::env as stdenv;

    fn state_here() -> ShellState {
        ShellState {
            search_path: SearchPath::default(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
        }
    }

    fn run(
        factory: &dyn CommandFactory,
        name: &str,
        args: &[&str],
        state: &mut ShellState,
    ) -> (Result<()>, String) {
        let cmd = factory.try_create(name, args).expect("factory should accept its name");
        let mut out = Vec::new();
        let res = cmd.execute(&mut out, state);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_factory_ignores_other_names() {
        assert!(Factory::<Cd>::default().try_create("ls", &[]).is_none());
        assert!(Factory::<Exit>::default().try_create("exit", &[]).is_some());
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("builtin_cd_abs").expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_here();

        let target = canonical_temp.to_string_lossy().to_string();
        let (res, _) = run(&Factory::<Cd>::default(), "cd", &[&target], &mut state);
        assert!(res.is_ok());

        let new_canonical = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_canonical, canonical_temp);
        assert_eq!(state.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_relative_to_current_dir() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("builtin_cd_rel").unwrap();
        fs::create_dir_all(temp.join("inner")).unwrap();
        let canonical_inner = fs::canonicalize(temp.join("inner")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut state = state_here();
        state.current_dir = temp.clone();
        let (res, _) = run(&Factory::<Cd>::default(), "cd", &["inner"], &mut state);
        assert!(res.is_ok());
        assert_eq!(state.current_dir, canonical_inner);

        stdenv::set_current_dir(orig).unwrap();
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_without_argument_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_here();

        let (res, _) = run(&Factory::<Cd>::default(), "cd", &[], &mut state);
        let err = res.unwrap_err();
        assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::MissingDirectory)));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_here();

        let name = format!("nonexistent_dir_for_wish_test_{}", std::process::id());
        let (res, _) = run(&Factory::<Cd>::default(), "cd", &[&name], &mut state);
        let err = res.unwrap_err();
        assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::ChangeDir { .. })));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(state.current_dir, orig);
    }

    #[test]
    fn test_cd_extra_arguments_is_usage_error() {
        let mut state = state_here();
        let (res, out) = run(&Factory::<Cd>::default(), "cd", &["/tmp", "/"], &mut state);
        let err = res.unwrap_err();
        assert!(matches!(err.downcast_ref::<ShellError>(), Some(ShellError::Usage(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_path_replaces_search_path() {
        let mut state = state_here();
        let (res, _) = run(&Factory::<SetPath>::default(), "path", &["/a", "/b"], &mut state);
        assert!(res.is_ok());
        assert_eq!(state.search_path.dirs(), &["/a".to_string(), "/b".to_string()]);

        let (res, _) = run(&Factory::<SetPath>::default(), "path", &["/c"], &mut state);
        assert!(res.is_ok());
        assert_eq!(state.search_path.dirs(), &["/c".to_string()]);

        let (res, _) = run(&Factory::<SetPath>::default(), "path", &[], &mut state);
        assert!(res.is_ok());
        assert!(state.search_path.dirs().is_empty());
    }

    #[test]
    fn test_cd_into_dash_prefixed_directory() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("builtin_cd_dash").unwrap();
        fs::create_dir_all(temp.join("-x")).unwrap();
        let canonical_dash = fs::canonicalize(temp.join("-x")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut state = state_here();
        state.current_dir = temp.clone();
        let (res, _) = run(&Factory::<Cd>::default(), "cd", &["-x"], &mut state);
        stdenv::set_current_dir(orig).unwrap();

        assert!(res.is_ok(), "cd -x failed: {:?}", res);
        assert_eq!(state.current_dir, canonical_dash);
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_path_accepts_dash_prefixed_directories() {
        let mut state = state_here();
        let args = ["-dir", "/bin", "--help"];
        let (res, _) = run(&Factory::<SetPath>::default(), "path", &args, &mut state);
        assert!(res.is_ok(), "path failed: {:?}", res);
        assert_eq!(
            state.search_path.dirs(),
            &["-dir".to_string(), "/bin".to_string(), "--help".to_string()]
        );
    }

    #[test]
    fn test_exit_sets_flag() {
        let mut state = state_here();
        let (res, _) = run(&Factory::<Exit>::default(), "exit", &[], &mut state);
        assert!(res.is_ok());
        assert!(state.should_exit);
    }

    #[test]
    fn test_exit_with_arguments_is_rejected() {
        let mut state = state_here();
        let (res, _) = run(&Factory::<Exit>::default(), "exit", &["3"], &mut state);
        assert!(res.is_err());
        assert!(!state.should_exit);
    }

    #[test]
    fn test_help_prints_usage() {
        let mut state = state_here();
        let (res, out) = run(&Factory::<Help>::default(), "help", &[], &mut state);
        assert!(res.is_ok());
        assert_eq!(out, HELP);
    }

    #[test]
    fn test_builtin_help_flag_goes_to_stdout() {
        let mut state = state_here();
        let (res, out) = run(&Factory::<SetPath>::default(), "path", &["--help"], &mut state);
        assert!(res.is_ok());
        assert!(out.contains("Usage: path"), "unexpected help output: {}", out);
    }
}
