//! Parsed command lines.

/// One non-empty line of user input split on whitespace.
///
/// The first token is the command word; the rest are positional arguments.
/// There is no quoting and no flag syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    /// Splits `line` into tokens. Returns `None` for blank input.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// The command word.
    #[must_use]
    pub fn word(&self) -> &str {
        &self.tokens[0]
    }

    /// Arguments following the command word.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Number of tokens, command word included. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// All tokens, command word first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}
