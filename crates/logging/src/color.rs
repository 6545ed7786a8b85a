//! crates/logging/src/color.rs
//! ANSI markers used to highlight terminal output.

use std::fmt;

/// Named terminal colour markers.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    /// Resets all attributes.
    End,
    /// Bold green.
    Green,
    /// Bold purple.
    Purple,
    /// Bold red.
    Red,
    /// The framework's brand pink (24-bit).
    Sanic,
    /// Bold yellow.
    Yellow,
}

impl Color {
    /// Every marker, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::End,
        Self::Green,
        Self::Purple,
        Self::Red,
        Self::Sanic,
        Self::Yellow,
    ];

    /// Returns the escape sequence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::End => "\x1b[0m",
            Self::Green => "\x1b[01;32m",
            Self::Purple => "\x1b[01;35m",
            Self::Red => "\x1b[01;31m",
            Self::Sanic => "\x1b[38;2;255;13;104m",
            Self::Yellow => "\x1b[01;33m",
        }
    }

    /// Returns `text` between this marker and [`Color::End`].
    #[must_use]
    pub fn wrap(self, text: &str) -> String {
        format!("{self}{text}{}", Self::End)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
