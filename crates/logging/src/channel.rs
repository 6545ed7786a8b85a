//! crates/logging/src/channel.rs
//! The three named channels and the handlers attached to them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use logging_sink::Destination;

use crate::format::{FormatPolicy, Formatter, FormattingError, fallback_line};
use crate::record::LogRecord;
use crate::severity::Severity;
use crate::verbosity::VerbosityFilter;

/// Identifies one of the three server channels.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ChannelKind {
    /// General server messages (`sanic.root`).
    General,
    /// Errors and tracebacks (`sanic.error`).
    Error,
    /// One line per handled request (`sanic.access`).
    Access,
}

impl ChannelKind {
    /// Every channel, in registry order.
    pub const ALL: [Self; 3] = [Self::General, Self::Error, Self::Access];

    /// Returns the logger key used in [`LoggingConfig`](crate::LoggingConfig).
    #[must_use]
    pub const fn logger_name(self) -> &'static str {
        match self {
            Self::General => "sanic.root",
            Self::Error => "sanic.error",
            Self::Access => "sanic.access",
        }
    }

    /// Returns the short channel name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Error => "error",
            Self::Access => "access",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a channel name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown logging channel '{0}'")]
pub struct ParseChannelError(String);

impl FromStr for ChannelKind {
    type Err = ParseChannelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "general" | "root" | "sanic.root" => Ok(Self::General),
            "error" | "sanic.error" => Ok(Self::Error),
            "access" | "sanic.access" => Ok(Self::Access),
            _ => Err(ParseChannelError(name.to_owned())),
        }
    }
}

/// A formatter bound to a destination.
pub struct Handler {
    name: String,
    formatter: Arc<Formatter>,
    destination: Arc<dyn Destination>,
    dropped: AtomicU64,
}

impl Handler {
    /// Binds `formatter` to `destination` under the handler name `name`.
    pub fn new(
        name: impl Into<String>,
        formatter: Arc<Formatter>,
        destination: Arc<dyn Destination>,
    ) -> Self {
        Self {
            name: name.into(),
            formatter,
            destination,
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formatter used by this handler.
    #[must_use]
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Number of lines the destination refused since the handler was built.
    #[must_use]
    pub fn dropped_lines(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn write(&self, line: &str) {
        if let Err(error) = self.destination.write_line(line) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(
                target: "sanic::internal",
                handler = %self.name,
                dropped,
                %error,
                "log line dropped"
            );
        }
    }

    fn flush(&self) {
        if let Err(error) = self.destination.flush() {
            tracing::debug!(
                target: "sanic::internal",
                handler = %self.name,
                %error,
                "flush failed"
            );
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("formatter", &self.formatter.name())
            .field("dropped", &self.dropped_lines())
            .finish_non_exhaustive()
    }
}

/// A named logger: severity gate, shared verbosity gate and handlers.
#[derive(Debug)]
pub struct Channel {
    kind: ChannelKind,
    name: String,
    level: Severity,
    propagate: bool,
    handlers: Vec<Handler>,
    filter: Arc<VerbosityFilter>,
    policy: FormatPolicy,
}

impl Channel {
    pub(crate) fn new(
        kind: ChannelKind,
        name: String,
        level: Severity,
        propagate: bool,
        handlers: Vec<Handler>,
        filter: Arc<VerbosityFilter>,
        policy: FormatPolicy,
    ) -> Self {
        Self {
            kind,
            name,
            level,
            propagate,
            handlers,
            filter,
            policy,
        }
    }

    /// Returns which channel this is.
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Returns the name rendered by `%(name)s`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the minimum severity written.
    #[must_use]
    pub const fn level(&self) -> Severity {
        self.level
    }

    /// Returns the configured `propagate` flag.
    #[must_use]
    pub const fn propagate(&self) -> bool {
        self.propagate
    }

    /// Returns the attached handlers.
    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Returns the shared verbosity filter.
    #[must_use]
    pub fn filter(&self) -> &Arc<VerbosityFilter> {
        &self.filter
    }

    /// Reports whether a record of `severity` passes the level gate.
    #[must_use]
    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        severity >= self.level
    }

    /// Writes `record` to every handler when it passes both gates.
    ///
    /// Returns `Ok(false)` when the record was filtered out. Under
    /// [`FormatPolicy::Strict`] a rendering failure is returned and nothing is
    /// written; under [`FormatPolicy::Fallback`] the failing handler writes
    /// `LEVEL:name:message` instead.
    pub fn log(&self, record: &LogRecord) -> Result<bool, FormattingError> {
        if !self.is_enabled_for(record.severity()) || !self.filter.should_emit(record) {
            return Ok(false);
        }

        let mut lines = Vec::with_capacity(self.handlers.len());
        for handler in &self.handlers {
            let line = match handler.formatter.format(record, &self.name) {
                Ok(line) => line,
                Err(error) if self.policy == FormatPolicy::Fallback => {
                    tracing::debug!(
                        target: "sanic::internal",
                        channel = %self.kind,
                        handler = %handler.name,
                        %error,
                        "record rendered with fallback layout"
                    );
                    fallback_line(record, &self.name)
                }
                Err(error) => return Err(error),
            };
            lines.push(line);
        }

        for (handler, line) in self.handlers.iter().zip(&lines) {
            handler.write(line);
        }
        Ok(true)
    }

    /// Logs an untagged `message` at `severity`.
    pub fn emit(
        &self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<bool, FormattingError> {
        self.log(&LogRecord::new(self.kind, severity, message))
    }

    /// Flushes every handler destination.
    pub fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}
