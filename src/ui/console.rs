//! Line-oriented console used for menus and login instructions

use std::io::{self, BufRead, Write};

/// Prompt/status channel for interactive authentication
///
/// Implemented over any reader/writer pair so menus can be driven from
/// scripted input in tests.
pub trait Console {
    /// Print one line of status or menu text
    fn say(&mut self, line: &str);

    /// Print `prompt` (no newline) and read one trimmed line.
    /// Returns `Ok(None)` when input is closed.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Console over a buffered reader and a writer
pub struct LineConsole<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consume the console and return what was written
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn say(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{}", line);
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut input = String::new();
        if self.reader.read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }
}

/// Console on the process terminal: reads stdin, writes stderr
pub type TerminalConsole = LineConsole<io::StdinLock<'static>, io::Stderr>;

/// Create a console bound to stdin/stderr
pub fn terminal_console() -> TerminalConsole {
    LineConsole::new(io::stdin().lock(), io::stderr())
}
