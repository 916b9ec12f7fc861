//! Lexical analysis (tokenization) of a single command line.
//!
//! Tokens are maximal runs of non-delimiter characters. Redirection operators are
//! not special here: `>`, `>>` and `<` come out as ordinary tokens when they are
//! written as separate words, and the parser decides what they mean.

/// Characters separating tokens.
const DELIMITERS: [char; 4] = [' ', '\t', '\r', '\n'];

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Lazy token stream over one line.
///
/// The cursor only moves forward; to start over, call [`tokenize`] again.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Tokens { line, pos: 0 }
    }

    /// The part of the line not consumed yet.
    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn skip_delimiters(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(is_delimiter);
        self.pos += rest.len() - trimmed.len();
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.skip_delimiters();
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(is_delimiter).unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }
}

/// Splits `line` into whitespace-delimited tokens.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens::new(line)
}
