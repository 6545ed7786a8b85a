use super::MessageSink;
use crate::line_mode::LineMode;
use std::io::{self, Write};

impl<W> MessageSink<W>
where
    W: Write,
{
    fn render_line(&mut self, line: &str, append_newline: bool) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        if append_newline {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Writes a single line using the sink's current [`LineMode`].
    pub fn write(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        self.render_line(line.as_ref(), self.line_mode.append_newline())
    }

    /// Writes `line` with an explicit [`LineMode`] without changing the sink.
    pub fn write_with_mode(
        &mut self,
        line: impl AsRef<str>,
        line_mode: LineMode,
    ) -> io::Result<()> {
        self.render_line(line.as_ref(), line_mode.append_newline())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
