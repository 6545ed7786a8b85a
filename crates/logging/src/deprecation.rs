//! crates/logging/src/deprecation.rs
//! One-shot deprecation notices.
//!
//! Deprecations bypass the channels and the verbosity filter entirely: each
//! call renders `[DEPRECATION v<version>] <message>` and hands it to a
//! [`WarningSink`]. When standard output is a terminal the prefix is
//! highlighted in red and the message in yellow.

use std::fmt;
use std::io::{self, Write as _};
use std::sync::{Arc, Mutex, PoisonError};

use is_terminal::IsTerminal;

use crate::color::Color;

/// A rendered deprecation notice.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeprecationWarning {
    text: String,
}

impl DeprecationWarning {
    /// Wraps already rendered text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the rendered text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DeprecationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Receiver of deprecation notices.
pub trait WarningSink: Send + Sync {
    /// Delivers one notice. Must not fail.
    fn warn(&self, warning: &DeprecationWarning);
}

/// Writes `DeprecationWarning: <text>` to standard error.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrWarnings;

impl WarningSink for StderrWarnings {
    fn warn(&self, warning: &DeprecationWarning) {
        tracing::warn!(target: "sanic::deprecation", text = %warning, "deprecation");
        let mut stderr = io::stderr().lock();
        // Nothing useful can be done when stderr is gone.
        let _ = writeln!(stderr, "DeprecationWarning: {warning}");
    }
}

/// Keeps every notice in memory, in emission order.
#[derive(Clone, Debug, Default)]
pub struct CollectedWarnings {
    warnings: Arc<Mutex<Vec<DeprecationWarning>>>,
}

impl CollectedWarnings {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the notices collected so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<DeprecationWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WarningSink for CollectedWarnings {
    fn warn(&self, warning: &DeprecationWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }
}

/// Where the emitter learns whether to colour its output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Interactivity {
    /// Ask whether standard output is a terminal on every call.
    #[default]
    Detect,
    /// Always colour.
    Always,
    /// Never colour.
    Never,
}

impl Interactivity {
    /// Resolves the setting to a yes/no answer.
    #[must_use]
    pub fn is_interactive(self) -> bool {
        match self {
            Self::Detect => stdout_is_interactive(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Reports whether standard output is attached to a terminal.
#[must_use]
pub fn stdout_is_interactive() -> bool {
    io::stdout().is_terminal()
}

/// Renders a deprecation notice.
///
/// ```
/// use logging::format_deprecation;
///
/// assert_eq!(
///     format_deprecation("X is removed", 21.12, false),
///     "[DEPRECATION v21.12] X is removed"
/// );
/// assert_eq!(
///     format_deprecation("X is removed", 22.0, true),
///     "\x1b[01;31m[DEPRECATION v22.0] \x1b[01;33mX is removed\x1b[0m"
/// );
/// ```
#[must_use]
pub fn format_deprecation(message: &str, version: f64, interactive: bool) -> String {
    let prefix = format!("[DEPRECATION v{}] ", render_version(version));
    if interactive {
        format!("{}{prefix}{}{message}{}", Color::Red, Color::Yellow, Color::End)
    } else {
        prefix + message
    }
}

/// Renders `version` the way a float literal prints: integral values keep
/// one decimal place.
fn render_version(version: f64) -> String {
    if version.is_finite() && version.fract() == 0.0 {
        format!("{version:.1}")
    } else {
        version.to_string()
    }
}

/// Emits a deprecation notice to standard error, colouring it when standard
/// output is a terminal.
pub fn deprecation(message: &str, version: f64) {
    DeprecationEmitter::default().emit(message, version);
}

/// Deprecation emitter with an explicit interactivity source and sink.
#[derive(Clone)]
pub struct DeprecationEmitter {
    interactivity: Interactivity,
    sink: Arc<dyn WarningSink>,
}

impl Default for DeprecationEmitter {
    fn default() -> Self {
        Self::new(Interactivity::Detect, Arc::new(StderrWarnings))
    }
}

impl fmt::Debug for DeprecationEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeprecationEmitter")
            .field("interactivity", &self.interactivity)
            .finish_non_exhaustive()
    }
}

impl DeprecationEmitter {
    /// Creates an emitter.
    #[must_use]
    pub fn new(interactivity: Interactivity, sink: Arc<dyn WarningSink>) -> Self {
        Self { interactivity, sink }
    }

    /// Renders and delivers one notice. Every call emits.
    pub fn emit(&self, message: &str, version: f64) {
        let text = format_deprecation(message, version, self.interactivity.is_interactive());
        self.sink.warn(&DeprecationWarning::new(text));
    }
}
