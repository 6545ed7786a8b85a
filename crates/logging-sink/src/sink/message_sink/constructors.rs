use super::MessageSink;
use crate::line_mode::LineMode;

impl<W> MessageSink<W> {
    /// Creates a sink that terminates every line with `\n`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_line_mode(writer, LineMode::WithNewline)
    }

    /// Creates a sink with the provided [`LineMode`].
    #[must_use]
    pub const fn with_line_mode(writer: W, line_mode: LineMode) -> Self {
        Self { writer, line_mode }
    }

    /// Returns the current [`LineMode`].
    #[must_use]
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    /// Consumes the sink and returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
