use std::fmt;

use crate::line_mode::LineMode;

/// Streaming sink that writes rendered log lines into an [`std::io::Write`] target.
///
/// The sink owns the writer and the [`LineMode`] that decides whether each
/// line gets a trailing newline. Every line is handed to the writer in a
/// single `write_all` call followed by the terminator, so a writer that is
/// locked around one [`write`](Self::write) never observes a partial line.
///
/// # Examples
///
/// ```
/// use logging_sink::{LineMode, MessageSink};
///
/// let mut sink = MessageSink::new(Vec::new());
/// sink.write("[2024-01-01 00:00:00 +0000] [42] [INFO] Goin' Fast")?;
/// sink.write_with_mode("no newline", LineMode::WithoutNewline)?;
///
/// let output = String::from_utf8(sink.into_inner()).unwrap();
/// assert_eq!(output, "[2024-01-01 00:00:00 +0000] [42] [INFO] Goin' Fast\nno newline");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Clone)]
pub struct MessageSink<W> {
    writer: W,
    line_mode: LineMode,
}

mod constructors;
mod writing;

impl<W> fmt::Debug for MessageSink<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSink")
            .field("writer", &self.writer)
            .field("line_mode", &self.line_mode)
            .finish()
    }
}
