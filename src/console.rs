//! The machine's only connection to the outside world: one character out at a time, one line
//! in at a time.

use std::io::{self, BufRead, Write};

/// The prompt written before waiting on a line of input.
pub const DEFAULT_PROMPT: &str = "> ";

pub trait Console {
  /// Appends one character to the output. Must not hold it back, since a program interleaves
  /// output with prompts for input.
  fn write_char(&mut self, c: char) -> io::Result<()>;

  /// Blocks until a full line of text is available and returns it without its line ending.
  /// Returns `None` when there is no more input.
  fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A `Console` over any buffered reader and writer.
pub struct IoConsole<R, W> {
  reader : R,
  writer : W,
  prompt : String,
}

impl IoConsole<io::BufReader<io::Stdin>, io::Stdout> {
  /// Binds the console to the process's standard input and output.
  pub fn stdio(prompt: &str) -> Self {
    IoConsole::new(io::BufReader::new(io::stdin()), io::stdout(), prompt)
  }
}

impl<R: BufRead, W: Write> IoConsole<R, W> {

  pub fn new(reader: R, writer: W, prompt: &str) -> Self {
    IoConsole {
      reader,
      writer,
      prompt: prompt.to_string()
    }
  }

  pub fn writer(&self) -> &W {
    &self.writer
  }

  pub fn into_parts(self) -> (R, W) {
    (self.reader, self.writer)
  }

}

impl<R: BufRead, W: Write> Console for IoConsole<R, W> {

  fn write_char(&mut self, c: char) -> io::Result<()> {
    let mut buffer = [0u8; 4];
    self.writer.write_all(c.encode_utf8(&mut buffer).as_bytes())?;
    self.writer.flush()
  }

  fn read_line(&mut self) -> io::Result<Option<String>> {
    if !self.prompt.is_empty() {
      self.writer.write_all(self.prompt.as_bytes())?;
      self.writer.flush()?;
    }

    let mut line = String::new();
    if self.reader.read_line(&mut line)? == 0 {
      return Ok(None);
    }
    // Strip "\n" or "\r\n".
    if line.ends_with('\n') {
      line.pop();
      if line.ends_with('\r') {
        line.pop();
      }
    }
    Ok(Some(line))
  }

}
