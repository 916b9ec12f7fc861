use anyhow::Context;
use argh::FromArgs;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use wish::Interpreter;

#[derive(FromArgs)]
/// A small command interpreter. Reads commands from the terminal, or from a script.
struct Args {
    #[argh(positional)]
    /// file to read commands from instead of the terminal.
    script: Option<PathBuf>,
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut sh = Interpreter::default();
    match args.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            sh.run_script(BufReader::new(file), &mut io::stdout(), &mut io::stderr())
        }
        // Piped input is read like a script: no prompt, no line editing.
        None if !io::stdin().is_terminal() => {
            sh.run_script(io::stdin().lock(), &mut io::stdout(), &mut io::stderr())
        }
        None => sh.repl().context("terminal input failed"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("wish: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
