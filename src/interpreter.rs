use crate::command::CommandFactory;
use crate::env::ShellState;
use crate::error::ShellError;
use crate::launcher::{self, LaunchConfig};
use crate::{lexer, parser};
use log::{debug, trace, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, Write};

/// Prompt shown before each line in interactive mode.
pub const PROMPT: &str = "wish> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate, see [`crate::builtin`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that runs built-in commands in-process and
/// external programs in the foreground.
///
/// Example
/// ```
/// use wish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// sh.execute_line("path /usr/bin /bin", &mut out).unwrap();
/// assert_eq!(sh.state().search_path.dirs().len(), 2);
/// ```
pub struct Interpreter {
    state: ShellState,
    builtins: Vec<Box<dyn CommandFactory>>,
}

/// Whether a line is skipped without being tokenized: blank, or a `#` comment.
fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

impl Interpreter {
    /// Create a new interpreter with a custom set of built-in factories.
    pub fn new(builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state: ShellState::new(),
            builtins,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Whether `exit` has run.
    pub fn should_exit(&self) -> bool {
        self.state.should_exit
    }

    /// Runs one input line to completion.
    ///
    /// Built-in output goes to `stdout`; external programs inherit the process
    /// streams unless redirected. Returns only after any started child has terminated.
    pub fn execute_line(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<()> {
        if is_skippable(line) {
            trace!("skipping {:?}", line);
            return Ok(());
        }

        let parsed = parser::parse(lexer::tokenize(line))?;
        let args: Vec<&str> = parsed.args.iter().map(String::as_str).collect();

        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(&parsed.name, &args) {
                if parsed.redirect.is_some() {
                    return Err(ShellError::BuiltinRedirect { name: parsed.name }.into());
                }
                cmd.execute(stdout, &mut self.state)?;
                stdout.flush()?;
                return Ok(());
            }
        }

        let program = self.state.search_path.resolve(&parsed.name)?;
        let config = LaunchConfig::new(program, &parsed, &self.state.current_dir);
        let handle = launcher::spawn(&config)?;
        debug!("waiting for pid {}", handle.id());
        handle.wait()?;
        Ok(())
    }

    /// Runs every line of `input` until end-of-input or `exit`, without prompting.
    ///
    /// Errors of individual lines, including lines that are not UTF-8, are written
    /// to `stderr` and do not stop the run; only a failure to read `input` is returned.
    pub fn run_script<R: BufRead>(
        &mut self,
        mut input: R,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let result = match std::str::from_utf8(&buf) {
                Ok(line) => self.execute_line(line, stdout),
                Err(_) => Err(ShellError::InvalidUtf8 { line: line_no }.into()),
            };
            report(result, stderr);
            if self.state.should_exit {
                break;
            }
        }
        Ok(())
    }

    /// Interactive Read-Eval-Print Loop on the terminal.
    ///
    /// Ctrl-C drops the current line, Ctrl-D ends the session.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.state.should_exit {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !is_skippable(&line) {
                        if let Err(err) = rl.add_history_entry(line.as_str()) {
                            warn!("history not updated: {}", err);
                        }
                    }
                    let result = self.execute_line(&line, &mut io::stdout());
                    report(result, &mut io::stderr());
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

fn report(result: anyhow::Result<()>, stderr: &mut dyn Write) {
    if let Err(err) = result {
        let _ = writeln!(stderr, "wish: {}", err);
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the built-ins `cd`, `path`, `exit` and `help`.
    fn default() -> Self {
        use crate::builtin::*;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<SetPath>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Help>::default()),
        ])
    }
}
