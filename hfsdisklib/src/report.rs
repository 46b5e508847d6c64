use std::fmt::Display;
use std::io::{self, Write};

use tracing::debug;

/// Message used when the failing layer supplied no text of its own
pub const GENERIC_MESSAGE: &str = "unknown error";

/// Formats volume-layer failures as `<prefix>: <message>` lines and writes
/// them to a diagnostic sink (standard error in the tool).
pub struct ErrorReporter<'a> {
  sink: Box<dyn Write + 'a>,
}

impl<'a> ErrorReporter<'a> {
  /// Reporter writing to an arbitrary sink
  pub fn new<W: Write + 'a>(sink: W) -> Self {
    Self {
      sink: Box::new(sink),
    }
  }

  /// Reporter writing to standard error
  pub fn stderr() -> ErrorReporter<'static> {
    ErrorReporter::new(io::stderr())
  }

  /// Report an error value under a context prefix
  pub fn report(&mut self, prefix: &str, err: &dyn Display) {
    self.report_message(prefix, &err.to_string());
  }

  /// Report plain message text under a context prefix
  pub fn report_message(&mut self, prefix: &str, message: &str) {
    let line = diagnostic(prefix, message);
    debug!(%line, "reporting failure");
    // A failing diagnostic sink has nowhere left to report to
    let _ = writeln!(self.sink, "{}", line);
    let _ = self.sink.flush();
  }
}

/// Build a single diagnostic line. Control characters (a catalog name may
/// hold a newline) are escaped so the line never breaks.
pub fn diagnostic(prefix: &str, message: &str) -> String {
  let message = match message.trim() {
    "" => GENERIC_MESSAGE,
    m => m,
  };
  format!("{}: {}", escape_controls(prefix), escape_controls(message))
}

fn escape_controls(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_control() {
      c.escape_default().to_string()
    } else {
      c.to_string()
    })
    .collect()
}
