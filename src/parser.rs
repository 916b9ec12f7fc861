use log::debug;
use thiserror::Error;

/// Upper bound on the number of arguments a command may receive.
pub const MAX_ARGS: usize = 256;

/// How a redirection attaches a file to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `< file`: open an existing file as standard input.
    Input,
    /// `> file`: create or truncate the file and use it as standard output.
    Output,
    /// `>> file`: create or append to the file and use it as standard output.
    Append,
}

impl RedirectKind {
    fn from_operator(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RedirectKind::Input),
            ">" => Some(RedirectKind::Output),
            ">>" => Some(RedirectKind::Append),
            _ => None,
        }
    }
}

/// I/O redirection of a command.
///
/// `target` is `None` when the operator was the last token on the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: Option<String>,
}

/// One command line split into name, arguments and redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    /// Arguments after the name. The program name itself is supplied at launch.
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsingError {
    #[error("empty command")]
    EmptyCommand,
    #[error("too many arguments ({count}, at most {max})")]
    TooManyArgs { count: usize, max: usize },
}

struct CommandBuilder<I> {
    tokens: I,
    args: Vec<String>,
    redirect: Option<Redirect>,
}

impl<'a, I: Iterator<Item = &'a str>> CommandBuilder<I> {
    fn from(tokens: I) -> Self {
        CommandBuilder {
            tokens,
            args: Vec::new(),
            redirect: None,
        }
    }

    fn build(mut self) -> Result<ParsedCommand, ParsingError> {
        let name = self.tokens.next().ok_or(ParsingError::EmptyCommand)?.to_string();

        while let Some(token) = self.tokens.next() {
            match RedirectKind::from_operator(token) {
                Some(kind) => self.parse_redirect(kind),
                None => self.args.push(token.to_string()),
            }
        }

        if self.args.len() > MAX_ARGS {
            return Err(ParsingError::TooManyArgs {
                count: self.args.len(),
                max: MAX_ARGS,
            });
        }

        Ok(ParsedCommand {
            name,
            args: self.args,
            redirect: self.redirect,
        })
    }

    /// Consumes the target after an operator. A later redirection replaces an earlier one.
    fn parse_redirect(&mut self, kind: RedirectKind) {
        let target = self.tokens.next().map(str::to_string);
        if let Some(previous) = self.redirect.replace(Redirect { kind, target }) {
            debug!("redirection {:?} overridden", previous);
        }
    }
}

/// Splits the tokens of one line into a [`ParsedCommand`].
///
/// The first token is the command name. `>`, `>>` and `<` take the following
/// token as their target; every other token is an argument, in order.
pub fn parse<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<ParsedCommand, ParsingError> {
    CommandBuilder::from(tokens.into_iter()).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_line(line: &str) -> ParsedCommand {
        parse(tokenize(line)).unwrap()
    }

    fn redirect(kind: RedirectKind, target: &str) -> Option<Redirect> {
        Some(Redirect {
            kind,
            target: Some(target.to_string()),
        })
    }

    #[test]
    fn name_and_arguments_in_order() {
        let cmd = parse_line("ls -l -a /tmp");
        assert_eq!(cmd.name, "ls");
        assert_eq!(cmd.args, vec!["-l", "-a", "/tmp"]);
        assert_eq!(cmd.redirect, None);
    }

    #[test]
    fn each_operator_sets_its_kind() {
        assert_eq!(parse_line("cmd > out").redirect, redirect(RedirectKind::Output, "out"));
        assert_eq!(parse_line("cmd >> out").redirect, redirect(RedirectKind::Append, "out"));
        assert_eq!(parse_line("cmd < in").redirect, redirect(RedirectKind::Input, "in"));
    }

    #[test]
    fn target_is_not_an_argument() {
        let cmd = parse_line("sort -r < input.txt -u");
        assert_eq!(cmd.name, "sort");
        assert_eq!(cmd.args, vec!["-r", "-u"]);
        assert_eq!(cmd.redirect, redirect(RedirectKind::Input, "input.txt"));
    }

    #[test]
    fn last_redirection_wins() {
        let cmd = parse_line("cmd > a >> b");
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.redirect, redirect(RedirectKind::Append, "b"));

        let cmd = parse_line("cmd < in > out arg");
        assert_eq!(cmd.args, vec!["arg"]);
        assert_eq!(cmd.redirect, redirect(RedirectKind::Output, "out"));
    }

    #[test]
    fn operator_without_target_records_none() {
        let cmd = parse_line("cmd arg >");
        assert_eq!(cmd.args, vec!["arg"]);
        assert_eq!(
            cmd.redirect,
            Some(Redirect {
                kind: RedirectKind::Output,
                target: None,
            })
        );
    }

    #[test]
    fn operator_as_target_is_taken_literally() {
        let cmd = parse_line("cmd > >>");
        assert_eq!(cmd.redirect, redirect(RedirectKind::Output, ">>"));
    }

    #[test]
    fn empty_line_is_an_error() {
        assert_eq!(parse(tokenize("   ")), Err(ParsingError::EmptyCommand));
    }

    #[test]
    fn too_many_arguments_rejected() {
        let line = format!("cmd {}", vec!["x"; MAX_ARGS + 1].join(" "));
        assert_eq!(
            parse(tokenize(&line)),
            Err(ParsingError::TooManyArgs {
                count: MAX_ARGS + 1,
                max: MAX_ARGS
            })
        );
        let line = format!("cmd {}", vec!["x"; MAX_ARGS].join(" "));
        assert_eq!(parse(tokenize(&line)).unwrap().args.len(), MAX_ARGS);
    }
}
