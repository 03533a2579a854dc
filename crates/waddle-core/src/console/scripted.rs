//! In-memory console ends for driving sessions without a terminal.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use super::LineSource;

#[derive(Debug, Default)]
struct Script {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

/// Pre-recorded input, for driving sessions without a terminal.
///
/// Clones share the same script, so a caller can keep a handle to inspect
/// the prompts that were shown.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Rc<RefCell<Script>>,
}

impl ScriptedSource {
    /// Creates a source that yields `lines` in order, then end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        };
        Self {
            script: Rc::new(RefCell::new(script)),
        }
    }

    /// Every prompt shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.script.borrow().prompts.clone()
    }

    /// Lines not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.borrow().lines.len()
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut script = self.script.borrow_mut();
        script.prompts.push(prompt.to_string());
        Ok(script.lines.pop_front())
    }
}

/// In-memory output sink whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
