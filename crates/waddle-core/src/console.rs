//! Line-oriented console: prompting, termination keywords and output.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use crate::command::CommandLine;

#[cfg(any(test, feature = "test-util"))]
mod scripted;

#[cfg(any(test, feature = "test-util"))]
pub use scripted::{ScriptedSource, Transcript};

/// Lines that end the current loop, compared after trimming and lowercasing.
pub const TERMINATION_COMMANDS: &[&str] = &["quit", "exit"];

/// Source of raw input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads from standard input, writing prompts to standard output.
#[derive(Debug, Default)]
pub struct StdinSource;

impl LineSource for StdinSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Outcome of prompting for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted {
    /// A non-empty command line.
    Command(CommandLine),
    /// The user asked to leave the current loop (or input ended).
    Terminate,
}

/// The user's console: one input source and one output sink.
pub struct Console {
    input: Box<dyn LineSource>,
    output: Box<dyn Write>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    /// Creates a console from an input source and an output sink.
    pub fn new(input: impl LineSource + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Console bound to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(StdinSource, io::stdout())
    }

    /// Console driven by a script, writing into a transcript.
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn scripted(input: ScriptedSource, output: Transcript) -> Self {
        Self::new(input, output)
    }

    /// Prompts until a non-blank line is entered.
    ///
    /// Returns `None` if the line is a termination keyword or input ended.
    /// The returned text is otherwise untouched, so it can carry
    /// case-sensitive values such as pasted URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the console fails.
    pub fn read_reply(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            let Some(line) = self.input.read_line(prompt)? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            if is_termination(&line) {
                return Ok(None);
            }
            return Ok(Some(line));
        }
    }

    /// Prompts for a command line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the console fails.
    pub fn read_command(&mut self, prompt: &str) -> io::Result<Prompted> {
        Ok(self
            .read_reply(prompt)?
            .and_then(|line| CommandLine::parse(&line))
            .map_or(Prompted::Terminate, Prompted::Command))
    }

    /// Writes `text` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the console fails.
    pub fn println(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }
}

/// Whether `line` is one of [`TERMINATION_COMMANDS`].
#[must_use]
pub fn is_termination(line: &str) -> bool {
    let normalized = line.trim().to_lowercase();
    TERMINATION_COMMANDS.contains(&normalized.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn console(lines: &[&str]) -> (Console, ScriptedSource) {
        let source = ScriptedSource::new(lines.iter().copied());
        (Console::scripted(source.clone(), Transcript::new()), source)
    }

    #[test]
    fn test_blank_lines_reprompt() {
        let (mut console, source) = console(&["", "   ", "recent 5"]);
        let prompted = console.read_command("> ").unwrap();

        let Prompted::Command(line) = prompted else {
            panic!("expected a command");
        };
        assert_eq!(line.word(), "recent");
        assert_eq!(source.prompts(), vec!["> "; 3]);
    }

    #[test]
    fn test_termination_keywords() {
        for keyword in ["quit", "exit", "  QUIT  ", "Exit"] {
            let (mut console, source) = console(&[keyword, "recent"]);
            assert_eq!(console.read_command("> ").unwrap(), Prompted::Terminate);
            assert_eq!(source.remaining(), 1);
        }
    }

    #[test]
    fn test_keyword_with_arguments_is_a_command() {
        let (mut console, _) = console(&["quit now"]);
        assert!(matches!(
            console.read_command("> ").unwrap(),
            Prompted::Command(line) if line.word() == "quit"
        ));
    }

    #[test]
    fn test_end_of_input_terminates() {
        let (mut console, _) = console(&[]);
        assert_eq!(console.read_command("> ").unwrap(), Prompted::Terminate);
    }

    #[test]
    fn test_reply_keeps_case() {
        let (mut console, _) = console(&["https://example.com/?code=AbC"]);
        assert_eq!(
            console.read_reply("> ").unwrap().as_deref(),
            Some("https://example.com/?code=AbC")
        );
    }

    #[test]
    fn test_println_goes_to_transcript() {
        let transcript = Transcript::new();
        let mut console = Console::scripted(ScriptedSource::default(), transcript.clone());
        console.println("hello").unwrap();
        assert_eq!(transcript.contents(), "hello\n");
    }

    proptest! {
        #[test]
        fn prop_termination_never_dispatches(
            keyword in prop::sample::select(vec!["quit", "exit"]),
            upper in any::<bool>(),
            pad in " {0,3}",
        ) {
            let word = if upper { keyword.to_uppercase() } else { keyword.to_string() };
            let line = format!("{pad}{word}{pad}");
            let (mut console, _) = console(&[line.as_str()]);
            prop_assert_eq!(console.read_command("> ").unwrap(), Prompted::Terminate);
        }
    }
}
