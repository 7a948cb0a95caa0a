//! Console I/O for interpreted programs
//!
//! The interpreter never touches stdout or stdin directly: every `print`
//! goes through [`Console::output`] and every `inputi`/`inputs` through
//! [`Console::get_input`]. [`StdConsole`] wires the trait to the real
//! terminal; [`BufferConsole`] captures output and scripts input for tests
//! and embedders.

use std::collections::VecDeque;
use std::io::{self, BufRead};

/// The I/O collaborator supplied by the driver.
pub trait Console {
    /// Emit one line of program output.
    fn output(&mut self, text: &str);

    /// Read one line of input, without the trailing newline. Returns an
    /// empty string at end of input.
    fn get_input(&mut self) -> String;
}

/// A console backed by stdout and stdin.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Create a standard console.
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn output(&mut self, text: &str) {
        println!("{}", text);
    }

    fn get_input(&mut self) -> String {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return String::new();
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        line
    }
}

/// A console that records output lines and replays scripted input lines.
#[derive(Debug, Default)]
pub struct BufferConsole {
    outputs: Vec<String>,
    inputs: VecDeque<String>,
}

impl BufferConsole {
    /// Create a console with no scripted input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console that will serve the given input lines in order.
    pub fn with_input(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            outputs: Vec::new(),
            inputs: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Queue one more input line.
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.inputs.push_back(line.into());
    }

    /// The output lines recorded so far.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

impl Console for BufferConsole {
    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn get_input(&mut self) -> String {
        self.inputs.pop_front().unwrap_or_default()
    }
}
