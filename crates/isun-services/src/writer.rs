//! Output sink for forecast renderings.

use std::io::Write as _;

/// Receives one line of text per emitted forecast or notice.
pub trait Writer: Send + Sync {
    fn write(&self, text: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleWriter;

impl Writer for ConsoleWriter {
    fn write(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", text) {
            tracing::warn!("Failed to write to stdout: {}", e);
        }
    }
}
