//! Line-oriented I/O seam between the interpreter and its host.
//!
//! The interpreter itself never touches the process streams; it reads and
//! writes through the [`LineReader`] and [`LineWriter`] traits. The driver
//! supplies [`StdinReader`] and [`StdoutWriter`]; tests use the in-memory
//! [`ScriptedReader`] and [`CollectWriter`].

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of input lines for `INPUT` statements.
pub trait LineReader {
    /// Reads one line with the trailing newline removed; `None` at end of
    /// input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Sink for `OUTPUT` lines and `INPUT` prompts.
pub trait LineWriter {
    /// Writes one complete output line (the newline is added here).
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Writes a prompt without a newline and flushes so it is visible
    /// before the read blocks.
    fn write_prompt(&mut self, prompt: &str) -> io::Result<()>;
}

/// `LineReader` over the process's standard input.
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buffer = String::new();
        let read = io::stdin().lock().read_line(&mut buffer)?;
        if read == 0 {
            return Ok(None);
        }
        while buffer.ends_with('\n') || buffer.ends_with('\r') {
            buffer.pop();
        }
        Ok(Some(buffer))
    }
}

/// `LineWriter` over the process's standard output.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl LineWriter for StdoutWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")
    }

    fn write_prompt(&mut self, prompt: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(prompt.as_bytes())?;
        out.flush()
    }
}

/// A `LineReader` over a fixed script of lines.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
}

impl ScriptedReader {
    /// One queued line per line of `input`.
    pub fn new(input: &str) -> Self {
        Self {
            lines: input.lines().map(str::to_string).collect(),
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// A `LineWriter` that collects everything written for later inspection.
#[derive(Debug, Default)]
pub struct CollectWriter {
    /// Output lines, in order, without newlines.
    pub lines: Vec<String>,

    /// Prompts, in order.
    pub prompts: Vec<String>,
}

impl CollectWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineWriter for CollectWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn write_prompt(&mut self, prompt: &str) -> io::Result<()> {
        self.prompts.push(prompt.to_string());
        Ok(())
    }
}
