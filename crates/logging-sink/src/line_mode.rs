/// Controls whether a [`MessageSink`](crate::MessageSink) terminates each rendered line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineMode {
    /// Append `\n` after each line. Log destinations always use this mode.
    #[default]
    WithNewline,
    /// Emit the text exactly as given.
    WithoutNewline,
}

impl LineMode {
    /// Reports whether the mode appends a trailing newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging_sink::LineMode;
    ///
    /// assert!(LineMode::WithNewline.append_newline());
    /// assert!(!LineMode::WithoutNewline.append_newline());
    /// ```
    #[must_use]
    pub const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }
}

impl From<bool> for LineMode {
    /// `true` selects [`LineMode::WithNewline`], `false` selects
    /// [`LineMode::WithoutNewline`].
    fn from(append_newline: bool) -> Self {
        if append_newline {
            Self::WithNewline
        } else {
            Self::WithoutNewline
        }
    }
}

impl From<LineMode> for bool {
    fn from(mode: LineMode) -> Self {
        mode.append_newline()
    }
}
