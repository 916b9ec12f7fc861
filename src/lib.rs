//! `wish`: a small line-oriented command interpreter.
//!
//! Lines come from a terminal or a script. Each line is split into tokens, parsed
//! into a command with optional `<`, `>` or `>>` redirection, and then either run
//! in-process as a built-in (`cd`, `path`, `help`, `exit`) or resolved against the
//! search path and started as a child process that the interpreter waits for.
//!
//! The main entry point is [`Interpreter`].

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod interpreter;
pub mod launcher;
pub mod lexer;
pub mod parser;
pub mod search_path;

pub use error::ShellError;
pub use interpreter::{Interpreter, PROMPT};
