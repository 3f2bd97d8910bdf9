//! Line-oriented prompting over any reader/writer pair.

use std::{
    fmt,
    io::{self, BufRead, Write},
};

/// Errors raised while prompting.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The input reached end-of-file before an answer was given.
    #[error("input closed before exit; changes were not saved")]
    InputClosed,

    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Asks questions on `output` and reads one-line answers from `input`.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes `question` (without a newline) and reads the answer.
    ///
    /// The line terminator is stripped; all other whitespace is kept.
    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::InputClosed);
        }

        let answer = line.strip_suffix('\n').unwrap_or(&line);
        let answer = answer.strip_suffix('\r').unwrap_or(answer);
        Ok(answer.to_string())
    }

    /// Writes a line of text.
    pub fn say(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Direct access to the output, for multi-line reports.
    pub const fn output(&mut self) -> &mut W {
        &mut self.output
    }
}
